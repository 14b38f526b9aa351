//! Levenshtein-based partial-ratio scoring on top of `rapidfuzz`'s indel ratio.

use rapidfuzz::fuzz;

/// Indel similarity of two char slices, scaled to 0..=100.
fn ratio_chars(a: &[char], b: &[char]) -> u32 {
    if a.is_empty() || b.is_empty() {
        return 0;
    }
    let similarity = fuzz::ratio(a.iter().copied(), b.iter().copied());
    (100.0 * similarity).round() as u32
}

pub fn ratio(a: &str, b: &str) -> u32 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    ratio_chars(&a, &b)
}

fn partial_ratio_chars(a: &[char], b: &[char]) -> u32 {
    let (shorter, longer) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    if shorter.is_empty() {
        return 0;
    }

    let mut best = 0;
    for window in longer.windows(shorter.len()) {
        let score = ratio_chars(shorter, window);
        if score == 100 {
            return 100;
        }
        best = best.max(score);
    }
    best
}

/// Best [`ratio`] of the shorter string against every same-length slice of the longer one.
pub fn partial_ratio(a: &str, b: &str) -> u32 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    partial_ratio_chars(&a, &b)
}

/// Scores candidates against one query. The query is lower-cased once up front.
pub struct FuzzyMatcher {
    query: Vec<char>,
}

impl FuzzyMatcher {
    pub fn new(query: &str) -> Self {
        Self {
            query: query.to_lowercase().chars().collect(),
        }
    }

    /// Sum of the partial ratios against the abbreviation and the target string, 0..=200.
    pub fn combined(&self, abbreviation: &str, target: &str) -> u32 {
        let abbreviation: Vec<char> = abbreviation.to_lowercase().chars().collect();
        let target: Vec<char> = target.to_lowercase().chars().collect();
        partial_ratio_chars(&self.query, &abbreviation) + partial_ratio_chars(&self.query, &target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ratio_basics() {
        assert_eq!(ratio("abc", "abc"), 100);
        assert_eq!(ratio("abc", "abd"), 67);
        assert_eq!(ratio("abc", "xyz"), 0);
        assert_eq!(ratio("", "abc"), 0);
    }

    #[test]
    fn partial_ratio_finds_substrings() {
        assert_eq!(partial_ratio("chat", "wechat"), 100);
        assert_eq!(partial_ratio("wechat", "chat"), 100);
        assert_eq!(partial_ratio("wx", "weixin"), 50);
        assert_eq!(partial_ratio("", "weixin"), 0);
        assert_eq!(partial_ratio("q", ""), 0);
    }

    #[test]
    fn partial_ratio_is_char_based() {
        assert_eq!(partial_ratio("音乐", "qq音乐"), 100);
        assert_eq!(partial_ratio("音", "乐"), 0);
    }

    #[test]
    fn combined_is_case_insensitive() {
        let m = FuzzyMatcher::new("YY");
        assert_eq!(m.combined("YY", "音乐,com.example.music,YINYUE,YY"), 200);

        let m = FuzzyMatcher::new("yy");
        assert_eq!(m.combined("W", "WeChat,com.tencent.mm,WeChat,W"), 0);
    }
}
