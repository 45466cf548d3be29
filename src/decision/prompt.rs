//! 提示词构建
//!
//! 固定骨架：动作目录 -> 观察段 -> 任务 -> 历史 -> 输出格式与示例。
//! 文本模式嵌入元素列表；视觉模式只说明已附图，并在坐标动作下给出屏幕范围与网格提示。
//! 两种模式的示例不同：坐标示例在文本模式为 (100, 200)，视觉模式为 (25, 25)。

use crate::action::{ActionKind, ScreenLimits};
use crate::decision::{History, ObservationMode};
use crate::env::{DomElement, Observation};

const SECTION_RULE: &str = "----";
const GRID_HINT: &str =
    "Look at the history: if a coordinate didn't work previously, try a new one in a grid of size 10.";
const TEXT_EXAMPLES: [&str; 3] = ["CLICK_ELEMENT 1", "NONE", "MOVE_COORDS 100 200"];
const IMAGE_EXAMPLES: [&str; 3] = ["CLICK_ELEMENT 1", "NONE", "MOVE_COORDS 25 25"];

#[derive(Debug, Clone, Copy, Default)]
pub struct PromptBuilder {
    mode: ObservationMode,
}

impl PromptBuilder {
    pub fn new(mode: ObservationMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> ObservationMode {
        self.mode
    }

    pub fn build(
        &self,
        observation: &Observation,
        history: &History,
        limits: Option<&ScreenLimits>,
    ) -> String {
        let mut prompt = String::with_capacity(1024);
        prompt.push_str("You are on a webpage. \n\nHere are your available actions:\n\n");
        prompt.push_str(&self.action_catalogue(limits));

        prompt.push_str(SECTION_RULE);
        prompt.push_str("\nObservation:\n");
        match self.mode {
            ObservationMode::Text => {
                prompt.push_str("You see the following elements: \n");
                prompt.push_str(&render_elements(&observation.dom_elements));
                prompt.push('\n');
            }
            ObservationMode::Image => prompt.push_str("You see the image provided to you.\n"),
        }

        prompt.push('\n');
        prompt.push_str(SECTION_RULE);
        prompt.push_str("\nTask:\nHere is your task:\n");
        prompt.push_str(observation.utterance.trim());
        prompt.push_str("\n\n");

        prompt.push_str(SECTION_RULE);
        prompt.push_str("\nHistory:\n");
        prompt.push_str(&history.render());
        prompt.push('\n');
        prompt.push_str(SECTION_RULE);

        prompt.push_str("\n\nOutput ONE action at a time using the following format:\nACTION_TYPE [ARGS]\n");
        let examples = match self.mode {
            ObservationMode::Text => TEXT_EXAMPLES,
            ObservationMode::Image => IMAGE_EXAMPLES,
        };
        for (i, example) in examples.iter().enumerate() {
            prompt.push_str(&format!("\nExample {}:\n{}\n", i + 1, example));
        }
        prompt.push_str(SECTION_RULE);
        prompt.push_str("\nYour action:\n");
        prompt
    }

    fn action_catalogue(&self, limits: Option<&ScreenLimits>) -> String {
        let mut out = String::new();
        for kind in ActionKind::ALL {
            out.push_str(kind.signature());
            out.push('\n');
            out.push_str(kind.description());
            out.push('\n');
            // 屏幕范围与网格提示只在视觉模式下出现
            if kind.takes_coords() && self.mode == ObservationMode::Image {
                if let Some(l) = limits {
                    out.push_str(&format!(
                        "X Coordinates are between 0 and {}.\nY Coordinates are between 0 and {}.\n",
                        l.screen_width, l.screen_height
                    ));
                }
                out.push_str(GRID_HINT);
                out.push('\n');
            }
            out.push('\n');
        }
        out
    }
}

/// 每个元素一行：ref、标签、文本，以及非空的 value / id / class 和位置
fn render_elements(elements: &[DomElement]) -> String {
    if elements.is_empty() {
        return "(no elements)".to_string();
    }
    elements
        .iter()
        .map(|e| {
            let mut line = format!("[ref={}] <{}> text={:?}", e.element_ref, e.tag, e.text);
            if !e.value.is_empty() {
                line.push_str(&format!(" value={:?}", e.value));
            }
            if !e.id.is_empty() {
                line.push_str(&format!(" id={:?}", e.id));
            }
            if !e.classes.is_empty() {
                line.push_str(&format!(" classes={:?}", e.classes));
            }
            line.push_str(&format!(
                " at ({}, {}) size {}x{}",
                e.left, e.top, e.width, e.height
            ));
            line
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn observation() -> Observation {
        Observation {
            utterance: "Click button ONE.".to_string(),
            dom_elements: vec![
                DomElement::new(2, "button", "ONE"),
                DomElement::new(3, "button", "TWO"),
            ],
            screenshot: None,
        }
    }

    const LIMITS: ScreenLimits = ScreenLimits {
        screen_width: 160,
        screen_height: 210,
    };

    #[test]
    fn test_text_prompt_sections() {
        let mut history = History::new(5);
        history.push("NONE");
        history.push("CLICK_ELEMENT 3");
        let prompt = PromptBuilder::new(ObservationMode::Text).build(&observation(), &history, None);

        for keyword in ["NONE", "MOVE_COORDS x y", "CLICK_COORDS x y", "CLICK_ELEMENT <element_ref>"] {
            assert!(prompt.contains(keyword), "missing {keyword}");
        }
        assert!(prompt.contains("[ref=2] <button> text=\"ONE\""));
        assert!(prompt.contains("Here is your task:\nClick button ONE."));
        assert!(prompt.contains("History:\nNONE\nCLICK_ELEMENT 3\n"));
        assert!(prompt.contains("ACTION_TYPE [ARGS]"));
        assert!(prompt.ends_with("Your action:\n"));
        assert!(!prompt.contains("image provided"));
    }

    #[test]
    fn test_history_precedes_instructions() {
        let mut history = History::new(5);
        history.push("MOVE_COORDS 1 1");
        let prompt = PromptBuilder::new(ObservationMode::Text).build(&observation(), &history, None);
        let history_at = prompt.find("MOVE_COORDS 1 1\n").unwrap();
        let format_at = prompt.find("Output ONE action").unwrap();
        assert!(history_at < format_at);
    }

    #[test]
    fn test_image_prompt_has_bounds_and_grid_hint() {
        let prompt = PromptBuilder::new(ObservationMode::Image).build(
            &observation(),
            &History::new(5),
            Some(&LIMITS),
        );
        assert!(prompt.contains("You see the image provided to you."));
        assert!(prompt.contains("X Coordinates are between 0 and 160."));
        assert!(prompt.contains("Y Coordinates are between 0 and 210."));
        assert_eq!(prompt.matches("grid of size 10").count(), 2);
        assert!(prompt.contains("Example 3:\nMOVE_COORDS 25 25\n"));
        assert!(!prompt.contains("MOVE_COORDS 100 200"));
        assert!(!prompt.contains("[ref=2]"));
    }

    #[test]
    fn test_text_prompt_omits_bounds_even_when_known() {
        let prompt = PromptBuilder::new(ObservationMode::Text).build(
            &observation(),
            &History::new(5),
            Some(&LIMITS),
        );
        assert!(!prompt.contains("Coordinates are between"));
        assert!(!prompt.contains("grid of size 10"));
        assert!(prompt.contains("Example 3:\nMOVE_COORDS 100 200\n"));
        assert!(!prompt.contains("MOVE_COORDS 25 25"));
    }

    #[test]
    fn test_empty_element_list() {
        let obs = Observation {
            utterance: "Wait.".to_string(),
            ..Observation::default()
        };
        let prompt = PromptBuilder::new(ObservationMode::Text).build(&obs, &History::new(5), None);
        assert!(prompt.contains("(no elements)"));
    }
}
