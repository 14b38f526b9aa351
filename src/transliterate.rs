//! Pinyin transliteration and abbreviation of display labels.
//!
//! Every CJK character becomes an upper-case syllable. Dictionary words win
//! over per-character readings, so polyphonic characters come out right in
//! common words ("音乐" is `YIN YUE`, not `YIN LE`). Everything else is
//! kept as-is.
//!
//! The abbreviation takes the initial of every syllable and of every
//! whitespace-delimited word of other text. Inside a word that also carries
//! syllables, an acronym run stays whole (`QQ音乐` is `QQYY`).

use pinyin::ToPinyin;
use std::collections::HashMap;

/// Words whose per-character reading is wrong.
const BUILTIN_OVERRIDES: &[(&str, &[&str])] = &[
    ("音乐", &["YIN", "YUE"]),
    ("银行", &["YIN", "HANG"]),
    ("行长", &["HANG", "ZHANG"]),
    ("重庆", &["CHONG", "QING"]),
    ("重启", &["CHONG", "QI"]),
    ("长沙", &["CHANG", "SHA"]),
    ("朝阳", &["ZHAO", "YANG"]),
    ("单车", &["DAN", "CHE"]),
    ("调度", &["DIAO", "DU"]),
    ("还款", &["HUAN", "KUAN"]),
    ("地图", &["DI", "TU"]),
    ("相机", &["XIANG", "JI"]),
];

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Transliteration {
    pub pinyin: String,
    pub abbreviation: String,
}

#[derive(Debug)]
enum Token {
    Syllable(String),
    Raw(String),
}

#[derive(Debug, Clone)]
pub struct Transliterator {
    overrides: HashMap<String, Vec<String>>,
    longest: usize,
}

impl Default for Transliterator {
    fn default() -> Self {
        Self::new()
    }
}

impl Transliterator {
    pub fn new() -> Self {
        let mut this = Self {
            overrides: HashMap::new(),
            longest: 0,
        };
        for (word, syllables) in BUILTIN_OVERRIDES {
            this.insert(word, syllables.iter().map(|s| s.to_string()).collect());
        }
        this
    }

    /// Built-in dictionary plus user entries of the form `word -> "SYL SYL"`.
    pub fn with_overrides(extra: &HashMap<String, String>) -> Self {
        let mut this = Self::new();
        for (word, reading) in extra {
            let syllables: Vec<String> = reading
                .split_whitespace()
                .map(|s| s.to_uppercase())
                .collect();
            if word.is_empty() || syllables.is_empty() {
                log::warn!("Ignoring empty transliteration override for {:?}", word);
                continue;
            }
            this.insert(word, syllables);
        }
        this
    }

    fn insert(&mut self, word: &str, syllables: Vec<String>) {
        self.longest = self.longest.max(word.chars().count());
        self.overrides.insert(word.to_string(), syllables);
    }

    fn lookup(&self, rest: &[char]) -> Option<(usize, &[String])> {
        let max = self.longest.min(rest.len());
        for len in (1..=max).rev() {
            let key: String = rest[..len].iter().collect();
            if let Some(syllables) = self.overrides.get(&key) {
                return Some((len, syllables.as_slice()));
            }
        }
        None
    }

    fn tokenize_word(&self, word: &str) -> Vec<Token> {
        let chars: Vec<char> = word.chars().collect();
        let mut tokens = Vec::new();
        let mut raw = String::new();
        let mut i = 0;

        while i < chars.len() {
            if let Some((len, syllables)) = self.lookup(&chars[i..]) {
                flush_raw(&mut raw, &mut tokens);
                tokens.extend(syllables.iter().cloned().map(Token::Syllable));
                i += len;
                continue;
            }

            match chars[i].to_pinyin().map(|p| p.plain()) {
                Some(plain) if !plain.is_empty() => {
                    flush_raw(&mut raw, &mut tokens);
                    tokens.push(Token::Syllable(plain.to_uppercase()));
                }
                _ => raw.push(chars[i]),
            }
            i += 1;
        }
        flush_raw(&mut raw, &mut tokens);
        tokens
    }

    pub fn transliterate(&self, label: &str) -> Transliteration {
        let mut words = Vec::new();
        let mut segments = Vec::new();

        for word in label.split_whitespace() {
            let tokens = self.tokenize_word(word);
            let mixed = tokens.iter().any(|t| matches!(t, Token::Syllable(_)));

            let mut spelled = String::new();
            let mut initials = String::new();
            for token in &tokens {
                match token {
                    Token::Syllable(s) => {
                        spelled.push_str(s);
                        initials.extend(s.chars().next());
                    }
                    Token::Raw(r) => {
                        spelled.push_str(r);
                        initials.push_str(&raw_initials(r, mixed));
                    }
                }
            }
            words.push(spelled);
            if !initials.is_empty() {
                segments.push(initials);
            }
        }

        Transliteration {
            pinyin: words.join(" "),
            abbreviation: collapse(&segments.join(" ")),
        }
    }

    pub fn abbreviate(&self, text: &str) -> String {
        self.transliterate(text).abbreviation
    }
}

fn flush_raw(raw: &mut String, tokens: &mut Vec<Token>) {
    if !raw.is_empty() {
        tokens.push(Token::Raw(std::mem::take(raw)));
    }
}

fn is_acronym(run: &str) -> bool {
    !run.is_empty() && run.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
}

fn raw_initials(run: &str, mixed: bool) -> String {
    if mixed && is_acronym(run) {
        return run.to_string();
    }
    run.chars()
        .find(|c| c.is_alphanumeric())
        .map(|c| c.to_uppercase().collect())
        .unwrap_or_default()
}

/// Second pass for multi-word labels: per-word segments fold into one key.
fn collapse(abbreviation: &str) -> String {
    abbreviation.split_whitespace().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dictionary_fixes_polyphonic_words() {
        let t = Transliterator::new().transliterate("音乐");
        assert_eq!(t.pinyin, "YINYUE");
        assert_eq!(t.abbreviation, "YY");
    }

    #[test]
    fn latin_label_uses_word_initials() {
        let tr = Transliterator::new();
        assert_eq!(tr.transliterate("WeChat").abbreviation, "W");
        assert_eq!(tr.transliterate("WeChat").pinyin, "WeChat");
        assert_eq!(tr.transliterate("Google Maps").abbreviation, "GM");
        assert_eq!(tr.transliterate("  Google   Maps ").pinyin, "Google Maps");
    }

    #[test]
    fn per_character_fallback() {
        let t = Transliterator::new().transliterate("微信");
        assert_eq!(t.pinyin, "WEIXIN");
        assert_eq!(t.abbreviation, "WX");
    }

    #[test]
    fn mixed_script_keeps_acronyms() {
        let t = Transliterator::new().transliterate("QQ音乐");
        assert_eq!(t.pinyin, "QQYINYUE");
        assert_eq!(t.abbreviation, "QQYY");
    }

    #[test]
    fn multi_word_abbreviation_collapses() {
        let t = Transliterator::new().transliterate("QQ 音乐");
        assert_eq!(t.pinyin, "QQ YINYUE");
        assert_eq!(t.abbreviation, "QY");
        assert!(!t.abbreviation.contains(' '));
    }

    #[test]
    fn latin_acronyms_take_one_initial_per_word() {
        let tr = Transliterator::new();
        assert_eq!(tr.abbreviate("HBO Max"), "HM");
        assert_eq!(tr.abbreviate("BBC News"), "BN");
        assert_eq!(tr.abbreviate("2048 Game"), "2G");
    }

    #[test]
    fn acronym_rule_is_ascii_only() {
        let tr = Transliterator::new();
        assert_eq!(tr.abbreviate("ТВ音乐"), "ТYY");
        assert_eq!(tr.abbreviate("2048音乐"), "2048YY");
        assert_eq!(tr.abbreviate("Qq音乐"), "QYY");
    }

    #[test]
    fn unsupported_scripts_pass_through() {
        let t = Transliterator::new().transliterate("Телеграм");
        assert_eq!(t.pinyin, "Телеграм");
        assert_eq!(t.abbreviation, "Т");
    }

    #[test]
    fn punctuation_only_words_have_no_initial() {
        let t = Transliterator::new().transliterate("Files - Pro");
        assert_eq!(t.abbreviation, "FP");
    }

    #[test]
    fn empty_label() {
        let t = Transliterator::new().transliterate("");
        assert_eq!(t, Transliteration::default());
    }

    #[test]
    fn abbreviation_is_deterministic_and_settles() {
        let tr = Transliterator::new();
        for label in ["音乐", "WeChat", "Google Maps", "QQ 音乐", "QQ音乐", "2048 Game", "微信", "HBO Max"] {
            let abbr = tr.abbreviate(label);
            assert_eq!(tr.abbreviate(label), abbr);
            let once = tr.abbreviate(&abbr);
            assert_eq!(tr.abbreviate(&once), once, "label {label}");
        }
        for key in ["W", "Y", "2", "Т"] {
            assert_eq!(tr.abbreviate(key), key);
        }
    }

    #[test]
    fn user_overrides_merge_with_builtin() {
        let mut extra = HashMap::new();
        extra.insert("长安".to_string(), "chang an".to_string());
        extra.insert("".to_string(), "X".to_string());
        let tr = Transliterator::with_overrides(&extra);

        assert_eq!(tr.transliterate("长安").abbreviation, "CA");
        assert_eq!(tr.transliterate("长安").pinyin, "CHANGAN");
        assert_eq!(tr.transliterate("音乐").abbreviation, "YY");
    }

    #[test]
    fn longest_dictionary_word_wins() {
        let mut extra = HashMap::new();
        extra.insert("乐".to_string(), "LE".to_string());
        let tr = Transliterator::with_overrides(&extra);
        assert_eq!(tr.transliterate("音乐").pinyin, "YINYUE");
        assert_eq!(tr.transliterate("乐").pinyin, "LE");
    }
}
