// The process-wide counter is shared by every test in a binary, so this
// file holds a single test.

use abap_js::{reset_unique_identifiers, translate};

#[test]
fn test_reset_restarts_generated_names() {
    reset_unique_identifiers();
    assert_eq!(
        translate("DO 5 TIMES. ENDDO.").unwrap(),
        "for (let unique1 = 0; unique1 < 5; unique1++) {\n}"
    );
    assert_eq!(
        translate("DO 5 TIMES. ENDDO.").unwrap(),
        "for (let unique2 = 0; unique2 < 5; unique2++) {\n}"
    );

    reset_unique_identifiers();
    assert_eq!(
        translate("DO 5 TIMES. ENDDO.").unwrap(),
        "for (let unique1 = 0; unique1 < 5; unique1++) {\n}"
    );
}
