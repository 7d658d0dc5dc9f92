/// A passage cut at every blank phrase that could be located.
///
/// `segments.len() == matched.len() + 1` always holds; `matched[i]` sits
/// between `segments[i]` and `segments[i + 1]`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SplitPassage<'a> {
    pub segments: Vec<String>,
    pub matched: Vec<&'a str>,
    pub unmatched: Vec<&'a str>,
}

impl SplitPassage<'_> {
    pub fn matched_count(&self) -> usize {
        self.matched.len()
    }
}

/// Cuts `text` at each phrase of `blanks`, processed in list order.
///
/// Each phrase consumes the first occurrence still left in the passage;
/// text already taken by an earlier phrase is never searched again and a
/// phrase cannot match across a previous cut. Phrases with no remaining
/// occurrence are reported in `unmatched` and leave the passage untouched.
pub fn split_passage<'a>(text: &str, blanks: &'a [String]) -> SplitPassage<'a> {
    let mut segments = vec![text.to_string()];
    let mut matched: Vec<&'a str> = Vec::with_capacity(blanks.len());
    let mut unmatched = Vec::new();

    for phrase in blanks {
        let hit = segments
            .iter()
            .enumerate()
            .find_map(|(i, segment)| segment.find(phrase.as_str()).map(|at| (i, at)));

        match hit {
            Some((i, at)) => {
                let tail = segments[i].split_off(at + phrase.len());
                segments[i].truncate(at);
                segments.insert(i + 1, tail);
                matched.insert(i, phrase.as_str());
            }
            None => unmatched.push(phrase.as_str()),
        }
    }

    let segments = segments
        .into_iter()
        .map(|segment| segment.trim().to_string())
        .collect();

    SplitPassage {
        segments,
        matched,
        unmatched,
    }
}
