//! Searchable target strings.
//!
//! The target string is the only field queries are matched against. It is a
//! cache over the label and identifier and is rebuilt with the
//! transliteration whenever the label changes.

use crate::transliterate::{Transliteration, Transliterator};

const SEPARATOR: &str = ",";

fn join<'a>(parts: impl IntoIterator<Item = &'a str>) -> String {
    parts
        .into_iter()
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(SEPARATOR)
}

pub fn app_target(label: &str, package: &str, t: &Transliteration) -> String {
    join([label, package, t.pinyin.as_str(), t.abbreviation.as_str()])
}

pub fn extension_target(
    name: &str,
    id: &str,
    t: &Transliteration,
    description: &str,
    keywords: &[String],
    transliterator: &Transliterator,
) -> String {
    let description_pinyin = transliterator.transliterate(description).pinyin;
    let keyword_pinyin: Vec<String> = keywords
        .iter()
        .map(|k| transliterator.transliterate(k).pinyin)
        .collect();

    let mut parts = vec![
        name,
        id,
        t.pinyin.as_str(),
        t.abbreviation.as_str(),
        description,
        description_pinyin.as_str(),
    ];
    for (keyword, pinyin) in keywords.iter().zip(&keyword_pinyin) {
        parts.push(keyword.as_str());
        parts.push(pinyin.as_str());
    }
    join(parts)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_target_has_every_part() {
        let tr = Transliterator::new();
        let t = tr.transliterate("音乐");
        assert_eq!(
            app_target("音乐", "com.example.music", &t),
            "音乐,com.example.music,YINYUE,YY"
        );
    }

    #[test]
    fn empty_parts_are_skipped() {
        let t = Transliteration::default();
        assert_eq!(app_target("", "org.pkg", &t), "org.pkg");
    }

    #[test]
    fn extension_target_includes_keywords() {
        let tr = Transliterator::new();
        let t = tr.transliterate("Files");
        let target = extension_target(
            "Files",
            "files",
            &t,
            "Browse storage",
            &["音乐".to_string(), "docs".to_string()],
            &tr,
        );
        assert_eq!(
            target,
            "Files,files,Files,F,Browse storage,Browse storage,音乐,YINYUE,docs,docs"
        );
    }
}
