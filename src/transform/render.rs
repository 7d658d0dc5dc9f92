use rand::Rng;
use rand::seq::SliceRandom;

use super::blanks::SplitPassage;
use crate::exercise::ExerciseRecord;

const COVERAGE: &str = "Lehrmittel Allgemeinbildung";
const SUBJECT_ROOT: &str = "/Allgemeinbildung";
const FIB_TITLE: &str = "✏✏Vervollständigen Sie die Lücken mit dem korrekten Begriff.✏✏";
const FIB_ANSWER_SIZE: u32 = 20;
const INLINE_TITLE: &str = "Wörter einordnen";
const INLINE_QUESTION: &str = "✏✏Wählen Sie die richtigen Wörter.✏✏";

/// Orders the inline-choice option pool of a record.
pub trait OptionShuffle {
    fn shuffle_options(&mut self, options: &mut [String]);
}

/// Shuffles with the wrapped random source.
#[derive(Debug)]
pub struct RandomOrder<R>(pub R);

impl<R: Rng> OptionShuffle for RandomOrder<R> {
    fn shuffle_options(&mut self, options: &mut [String]) {
        options.shuffle(&mut self.0);
    }
}

/// Leaves options in declared order.
#[derive(Clone, Copy, Debug, Default)]
pub struct KeepOrder;

impl OptionShuffle for KeepOrder {
    fn shuffle_options(&mut self, _options: &mut [String]) {}
}

fn header_lines(record: &ExerciseRecord) -> [String; 4] {
    [
        format!("Keywords\tSeite {}", record.page_number),
        format!("Coverage\t{COVERAGE}"),
        format!("Subject\t{SUBJECT_ROOT}/{}", record.subject),
        format!("Level\t{}", record.bloom_level),
    ]
}

/// Interleaves `Text` lines with one answer line per matched blank.
fn push_body<F>(lines: &mut Vec<String>, split: &SplitPassage<'_>, answer_line: F)
where
    F: Fn(&str) -> String,
{
    for (i, segment) in split.segments.iter().enumerate() {
        lines.push(format!("Text\t{segment}"));
        if let Some(&blank) = split.matched.get(i) {
            lines.push(answer_line(blank));
        }
    }
}

pub fn render_fib(record: &ExerciseRecord, split: &SplitPassage<'_>) -> String {
    let mut lines = vec!["Type\tFIB".to_string()];
    lines.extend(header_lines(record));
    lines.push(format!("Title\t{FIB_TITLE}"));
    lines.push(format!("Points\t{}", record.declared_blanks()));

    push_body(&mut lines, split, |blank| {
        format!("1\t{blank}\t{FIB_ANSWER_SIZE}")
    });

    lines.join("\n")
}

/// `options` is the already shuffled pool; every blank line reuses it as is.
pub fn render_inline_choice(
    record: &ExerciseRecord,
    split: &SplitPassage<'_>,
    options: &[String],
) -> String {
    let mut lines = vec!["Type\tInlinechoice".to_string()];
    lines.extend(header_lines(record));
    lines.push(format!("Title\t{INLINE_TITLE}"));
    lines.push(format!("Question\t{INLINE_QUESTION}"));
    lines.push(format!("Points\t{}", record.declared_blanks()));

    let choices = options.join("|");
    push_body(&mut lines, split, |blank| format!("1\t{choices}\t{blank}\t|"));

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::blanks::split_passage;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn capital_record() -> ExerciseRecord {
        ExerciseRecord {
            page_number: "12".into(),
            subject: "Geo".into(),
            bloom_level: "Erinnern".into(),
            text: "Paris is the capital of France.".into(),
            blanks: vec!["Paris".into(), "France".into()],
            wrong_substitutes: vec!["Berlin".into(), "Germany".into()],
        }
    }

    #[test]
    fn renders_fib_fragment() {
        let record = capital_record();
        let split = split_passage(&record.text, &record.blanks);

        let expected = [
            "Type\tFIB",
            "Keywords\tSeite 12",
            "Coverage\tLehrmittel Allgemeinbildung",
            "Subject\t/Allgemeinbildung/Geo",
            "Level\tErinnern",
            "Title\t✏✏Vervollständigen Sie die Lücken mit dem korrekten Begriff.✏✏",
            "Points\t2",
            "Text\t",
            "1\tParis\t20",
            "Text\tis the capital of",
            "1\tFrance\t20",
            "Text\t.",
        ]
        .join("\n");
        assert_eq!(render_fib(&record, &split), expected);
    }

    #[test]
    fn renders_inline_choice_fragment_with_fixed_pool() {
        let record = capital_record();
        let split = split_passage(&record.text, &record.blanks);
        let options = record.option_pool();

        let expected = [
            "Type\tInlinechoice",
            "Keywords\tSeite 12",
            "Coverage\tLehrmittel Allgemeinbildung",
            "Subject\t/Allgemeinbildung/Geo",
            "Level\tErinnern",
            "Title\tWörter einordnen",
            "Question\t✏✏Wählen Sie die richtigen Wörter.✏✏",
            "Points\t2",
            "Text\t",
            "1\tParis|France|Berlin|Germany\tParis\t|",
            "Text\tis the capital of",
            "1\tParis|France|Berlin|Germany\tFrance\t|",
            "Text\t.",
        ]
        .join("\n");
        assert_eq!(render_inline_choice(&record, &split, &options), expected);
    }

    #[test]
    fn points_follow_declared_blanks() {
        let mut record = capital_record();
        record.blanks.push("Rome".into());
        let split = split_passage(&record.text, &record.blanks);

        let fib = render_fib(&record, &split);
        assert!(fib.contains("Points\t3"));
        assert_eq!(fib.lines().filter(|l| l.starts_with("1\t")).count(), 2);
        assert_eq!(fib.lines().filter(|l| l.starts_with("Text\t")).count(), 3);

        let inline = render_inline_choice(&record, &split, &record.option_pool());
        assert!(inline.contains("Points\t3"));
        assert!(inline.contains("1\tParis|France|Rome|Berlin|Germany\tParis\t|"));
    }

    #[test]
    fn seeded_shuffle_is_a_permutation_and_repeatable() {
        let record = capital_record();
        let mut first = record.option_pool();
        let mut second = record.option_pool();

        RandomOrder(StdRng::seed_from_u64(7)).shuffle_options(&mut first);
        RandomOrder(StdRng::seed_from_u64(7)).shuffle_options(&mut second);
        assert_eq!(first, second);

        let mut sorted = first.clone();
        sorted.sort();
        assert_eq!(sorted, vec!["Berlin", "France", "Germany", "Paris"]);
    }

    #[test]
    fn keep_order_is_identity() {
        let mut options = vec!["b".to_string(), "a".to_string()];
        KeepOrder.shuffle_options(&mut options);
        assert_eq!(options, vec!["b", "a"]);
    }
}
