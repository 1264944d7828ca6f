use crate::{repository::MemoryRepository, rule::RuleSet};

/// Ｆｕｌｌｗｉｄｔｈ forms of printable ASCII.
pub fn wide() -> RuleSet {
    RuleSet::new("wide")
        .describe("en", "Fullwidth forms")
        .offset("fullwidth", 0x21, 0x7E, 0xFF01 - 0x21)
        .char(" ", "\u{3000}")
}

/// Back from fullwidth forms to ASCII.
pub fn unwide() -> RuleSet {
    RuleSet::new("unwide")
        .describe("en", "Fullwidth forms to ASCII")
        .reverse_entries(true)
        .offset("fullwidth", 0x21, 0x7E, 0xFF01 - 0x21)
        .char(" ", "\u{3000}")
}

/// Ⓒⓘⓡⓒⓛⓔⓓ letters and digits.
pub fn circled() -> RuleSet {
    RuleSet::new("circled")
        .describe("en", "Circled letters and digits")
        .offset("upper", 0x41, 0x5A, 0x24B6 - 0x41)
        .offset("lower", 0x61, 0x7A, 0x24D0 - 0x61)
        .offset("digits", 0x31, 0x39, 0x2460 - 0x31)
        .char("0", "\u{24EA}")
}

/// S̶t̶r̶i̶k̶e̶ through every character but spaces.
pub fn strike() -> RuleSet {
    RuleSet::new("strike")
        .describe("en", "Strikethrough")
        .default_output("\u{FFFC}\u{0336}")
        .char(" ", " ")
}

/// Letters in combining enclosing squares.
pub fn boxed() -> RuleSet {
    RuleSet::new("boxed")
        .describe("en", "Boxed letters")
        .range("letters", [0x41, 0x5A, 0x61, 0x7A], ["\u{FFFC}\u{20DE}"])
}

/// ʇxǝʇ uʍop-ǝpᴉsdn
pub fn flip() -> RuleSet {
    const UPSIDE_DOWN: [(&str, &str); 32] = [
        ("a", "\u{0250}"),
        ("b", "q"),
        ("c", "\u{0254}"),
        ("d", "p"),
        ("e", "\u{01DD}"),
        ("f", "\u{025F}"),
        ("g", "\u{0183}"),
        ("h", "\u{0265}"),
        ("i", "\u{1D09}"),
        ("j", "\u{027E}"),
        ("k", "\u{029E}"),
        ("l", "l"),
        ("m", "\u{026F}"),
        ("n", "u"),
        ("o", "o"),
        ("p", "d"),
        ("q", "b"),
        ("r", "\u{0279}"),
        ("s", "s"),
        ("t", "\u{0287}"),
        ("u", "n"),
        ("v", "\u{028C}"),
        ("w", "\u{028D}"),
        ("x", "x"),
        ("y", "\u{028E}"),
        ("z", "z"),
        (".", "\u{02D9}"),
        (",", "'"),
        ("'", ","),
        ("?", "\u{00BF}"),
        ("!", "\u{00A1}"),
        ("_", "\u{203E}"),
    ];
    UPSIDE_DOWN
        .into_iter()
        .fold(
            RuleSet::new("flip").describe("en", "Upside down").reverse_out(true),
            |set, (k, v)| set.char(k, v),
        )
}

/// Every preset, keyed by its name.
pub fn repository() -> MemoryRepository {
    [wide(), unwide(), circled(), strike(), boxed(), flip()]
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundle::{BuildOptions, Bundle};
    use crate::repository::Repository;
    use crate::stage::Stage;
    use std::borrow::Cow;

    fn run(set: RuleSet, text: &str) -> String {
        let bundle = Bundle::build(set.name().to_owned(), &[set], BuildOptions::default()).unwrap();
        bundle.apply(Cow::Borrowed(text)).unwrap().into_owned()
    }

    #[test]
    fn test_wide() {
        assert_eq!(run(wide(), "Hello, World!"), "Ｈｅｌｌｏ，\u{3000}Ｗｏｒｌｄ！");
    }

    #[test]
    fn test_unwide_round_trip() {
        let text = "Round trip: 1 + 1 = 2 ~";
        assert_eq!(run(unwide(), &run(wide(), text)), text);
    }

    #[test]
    fn test_circled() {
        assert_eq!(run(circled(), "Ab 109"), "Ⓐⓑ ①⓪⑨");
    }

    #[test]
    fn test_strike() {
        assert_eq!(run(strike(), "no way"), "n\u{0336}o\u{0336} w\u{0336}a\u{0336}y\u{0336}");
    }

    #[test]
    fn test_boxed() {
        assert_eq!(run(boxed(), "Hi 5"), "H\u{20DE}i\u{20DE} 5");
    }

    #[test]
    fn test_flip() {
        assert_eq!(run(flip(), "hello world!"), "\u{00A1}pl\u{0279}o\u{028D} oll\u{01DD}\u{0265}");
    }

    #[test]
    fn test_repository_lists_all() {
        assert_eq!(
            repository().list(),
            ["boxed", "circled", "flip", "strike", "unwide", "wide"]
        );
    }
}
