use crate::stage::Stage;
use std::borrow::Cow;

/// Input no stage should choke on.
pub const MIXED_SCRIPTS: &[&str] = &[
    "",
    " ",
    "Hello World 123",
    "déjà-vu",
    "Ｗｉｄｅ",
    "ⓒⓘⓡⓒⓛⓔⓓ",
    "Привет, мир",
    "日本語のテキスト",
    "مرحبا بالعالم",
    "e\u{0301}\u{0336}",
    "👩‍👩‍👧‍👦 🇳🇿",
    "\u{FFFC}\u{FFFC}",
    "\u{F811}\u{F812}\u{F813}",
];

/// Assert that a stage satisfies the universal contracts.
///
/// `$pass_through` lists inputs the stage must leave alone, borrowed.
#[macro_export]
macro_rules! assert_stage_contract {
    ($stage:expr, $pass_through:expr) => {
        $crate::testing::stage_contract::zero_copy_when_no_changes($stage, $pass_through);
        $crate::testing::stage_contract::needs_apply_is_accurate(
            $stage,
            $crate::testing::stage_contract::MIXED_SCRIPTS,
        );
        $crate::testing::stage_contract::no_panic_on_mixed_scripts($stage);
    };
}

pub fn zero_copy_when_no_changes<S: Stage>(stage: &S, pass_through: &[&str]) {
    for &input in pass_through {
        assert!(
            !stage.needs_apply(input).unwrap(),
            "`{}` claims to change pass-through input `{input}`",
            stage.name()
        );
        let out = stage.apply(Cow::Borrowed(input)).unwrap();
        assert_eq!(out, input);
        assert!(
            matches!(out, Cow::Borrowed(_)),
            "zero-copy violated on pass-through sample `{input}`"
        );
        assert_eq!(input as *const str, out.as_ref() as *const str);
    }
}

/// `needs_apply == false` must mean `apply` leaves the text as it is.
pub fn needs_apply_is_accurate<S: Stage>(stage: &S, samples: &[&str]) {
    for &input in samples {
        if stage.needs_apply(input).unwrap() {
            continue;
        }
        let out = stage.apply(Cow::Borrowed(input)).unwrap();
        assert_eq!(
            out,
            input,
            "`{}` changed `{input}` after needs_apply said no",
            stage.name()
        );
    }
}

pub fn no_panic_on_mixed_scripts<S: Stage>(stage: &S) {
    for &input in MIXED_SCRIPTS {
        if stage.needs_apply(input).unwrap() {
            // lookup failures are errors, never panics
            let _ = stage.apply(Cow::Borrowed(input));
        }
    }
}
