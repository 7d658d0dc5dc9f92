//! Fixed instructions sent to the model, one per question format.

pub const SYSTEM_PROMPT: &str = include_str!("../../prompts/system.txt");

/// Appended to the uploaded document so the model waits for the first format request.
pub const WAIT_INSTRUCTION: &str = "wait for the next interaction of the user.";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QuestionPrompt {
    pub name: &'static str,
    pub body: &'static str,
}

pub const QUESTION_PROMPTS: [QuestionPrompt; 8] = [
    QuestionPrompt {
        name: "single choice",
        body: include_str!("../../prompts/single_choice.txt"),
    },
    QuestionPrompt {
        name: "multiple choice",
        body: include_str!("../../prompts/multiple_choice.txt"),
    },
    QuestionPrompt {
        name: "kprim",
        body: include_str!("../../prompts/kprim.txt"),
    },
    QuestionPrompt {
        name: "true/false",
        body: include_str!("../../prompts/true_false.txt"),
    },
    QuestionPrompt {
        name: "drag & drop",
        body: include_str!("../../prompts/drag_drop.txt"),
    },
    QuestionPrompt {
        name: "blank exercises",
        body: include_str!("../../prompts/blank_exercises.txt"),
    },
    QuestionPrompt {
        name: "open fill-in-the-blank",
        body: include_str!("../../prompts/open_fib.txt"),
    },
    QuestionPrompt {
        name: "essay",
        body: include_str!("../../prompts/essay.txt"),
    },
];

/// 1-based step whose reply is the blank-exercise JSON.
pub const BLANK_EXERCISE_STEP: usize = 6;

pub fn initial_message(content: &str) -> String {
    format!("{content}\n\n{WAIT_INSTRUCTION}")
}
