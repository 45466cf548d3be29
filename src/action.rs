//! 动作词表：封闭的动作集合与回复解析
//!
//! 模型输出是不可信文本；parse_action 把一行 `ACTION_KEYWORD [ARGS]` 严格解析为 Action，
//! 纯函数、无副作用，不访问环境。

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::DecisionError;

/// 动作种类（关键字区分大小写）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionKind {
    None,
    MoveCoords,
    ClickCoords,
    ClickElement,
}

impl ActionKind {
    /// 全部动作种类，按提示词中的展示顺序
    pub const ALL: [ActionKind; 4] = [
        ActionKind::None,
        ActionKind::MoveCoords,
        ActionKind::ClickCoords,
        ActionKind::ClickElement,
    ];

    pub fn keyword(&self) -> &'static str {
        match self {
            ActionKind::None => "NONE",
            ActionKind::MoveCoords => "MOVE_COORDS",
            ActionKind::ClickCoords => "CLICK_COORDS",
            ActionKind::ClickElement => "CLICK_ELEMENT",
        }
    }

    /// 关键字后的参数写法（提示词用）
    pub fn signature(&self) -> &'static str {
        match self {
            ActionKind::None => "NONE",
            ActionKind::MoveCoords => "MOVE_COORDS x y",
            ActionKind::ClickCoords => "CLICK_COORDS x y",
            ActionKind::ClickElement => "CLICK_ELEMENT <element_ref>",
        }
    }

    /// 一行语义说明
    pub fn description(&self) -> &'static str {
        match self {
            ActionKind::None => "Do nothing for the current step.",
            ActionKind::MoveCoords => "Move the cursor to the specified coordinates.",
            ActionKind::ClickCoords => "Click on the specified coordinates.",
            ActionKind::ClickElement => "Click on the specified element using JavaScript.",
        }
    }

    pub fn takes_coords(&self) -> bool {
        matches!(self, ActionKind::MoveCoords | ActionKind::ClickCoords)
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

impl FromStr for ActionKind {
    type Err = DecisionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ActionKind::ALL
            .into_iter()
            .find(|k| k.keyword() == s)
            .ok_or_else(|| DecisionError::UnknownActionKind(s.to_string()))
    }
}

/// 屏幕尺寸：坐标动作的上界
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenLimits {
    pub screen_width: u32,
    pub screen_height: u32,
}

/// 提交给环境的动作；每步由解析器构造一次，提交后即丢弃
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    None,
    MoveCoords { x: u32, y: u32 },
    ClickCoords { x: u32, y: u32 },
    ClickElement {
        /// 观察中提供的元素句柄，对本模块不透明
        #[serde(rename = "ref")]
        element_ref: i64,
    },
}

impl Action {
    pub fn kind(&self) -> ActionKind {
        match self {
            Action::None => ActionKind::None,
            Action::MoveCoords { .. } => ActionKind::MoveCoords,
            Action::ClickCoords { .. } => ActionKind::ClickCoords,
            Action::ClickElement { .. } => ActionKind::ClickElement,
        }
    }

    /// 坐标必须落在 [0, width] x [0, height] 内；非坐标动作总是通过
    pub fn check_bounds(&self, limits: &ScreenLimits) -> Result<(), DecisionError> {
        let (x, y) = match self {
            Action::MoveCoords { x, y } | Action::ClickCoords { x, y } => (*x, *y),
            _ => return Ok(()),
        };
        if x > limits.screen_width || y > limits.screen_height {
            return Err(DecisionError::MalformedArguments {
                kind: self.kind(),
                reason: format!(
                    "coordinates ({x}, {y}) outside screen {}x{}",
                    limits.screen_width, limits.screen_height
                ),
            });
        }
        Ok(())
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::None => write!(f, "NONE"),
            Action::MoveCoords { x, y } => write!(f, "MOVE_COORDS {x} {y}"),
            Action::ClickCoords { x, y } => write!(f, "CLICK_COORDS {x} {y}"),
            Action::ClickElement { element_ref } => write!(f, "CLICK_ELEMENT {element_ref}"),
        }
    }
}

impl FromStr for Action {
    type Err = DecisionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_action(s)
    }
}

/// 解析模型回复：trim 后按空白切分，首个 token 为关键字
///
/// - `NONE`：多余 token 忽略
/// - `MOVE_COORDS` / `CLICK_COORDS`：恰好两个非负整数
/// - `CLICK_ELEMENT`：恰好一个整数
pub fn parse_action(text: &str) -> Result<Action, DecisionError> {
    let mut tokens = text.split_whitespace();
    let keyword = tokens.next().unwrap_or("");
    let kind: ActionKind = keyword.parse()?;
    let args: Vec<&str> = tokens.collect();

    match kind {
        ActionKind::None => Ok(Action::None),
        ActionKind::MoveCoords | ActionKind::ClickCoords => {
            let [x, y] = expect_args::<2>(kind, &args)?;
            let x = parse_coord(kind, x)?;
            let y = parse_coord(kind, y)?;
            Ok(if kind == ActionKind::MoveCoords {
                Action::MoveCoords { x, y }
            } else {
                Action::ClickCoords { x, y }
            })
        }
        ActionKind::ClickElement => {
            let [r] = expect_args::<1>(kind, &args)?;
            let element_ref = r.parse::<i64>().map_err(|_| DecisionError::MalformedArguments {
                kind,
                reason: format!("element ref {r:?} is not an integer"),
            })?;
            Ok(Action::ClickElement { element_ref })
        }
    }
}

fn expect_args<'a, const N: usize>(
    kind: ActionKind,
    args: &[&'a str],
) -> Result<[&'a str; N], DecisionError> {
    <[&str; N]>::try_from(args).map_err(|_| DecisionError::MalformedArguments {
        kind,
        reason: format!("expected {N} argument(s), got {}", args.len()),
    })
}

fn parse_coord(kind: ActionKind, raw: &str) -> Result<u32, DecisionError> {
    let value = raw.parse::<i64>().map_err(|_| DecisionError::MalformedArguments {
        kind,
        reason: format!("coordinate {raw:?} is not an integer"),
    })?;
    u32::try_from(value).map_err(|_| DecisionError::MalformedArguments {
        kind,
        reason: format!("coordinate {value} is out of range"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_renderings() {
        assert_eq!(parse_action("NONE"), Ok(Action::None));
        assert_eq!(
            parse_action("MOVE_COORDS 10 20"),
            Ok(Action::MoveCoords { x: 10, y: 20 })
        );
        assert_eq!(
            parse_action("CLICK_COORDS 0 0"),
            Ok(Action::ClickCoords { x: 0, y: 0 })
        );
        assert_eq!(
            parse_action("CLICK_ELEMENT 7"),
            Ok(Action::ClickElement { element_ref: 7 })
        );
    }

    #[test]
    fn test_parse_trims_and_splits_on_any_whitespace() {
        assert_eq!(
            parse_action("  \n CLICK_COORDS\t3   4\n"),
            Ok(Action::ClickCoords { x: 3, y: 4 })
        );
    }

    #[test]
    fn test_parse_none_ignores_extra_tokens() {
        assert_eq!(parse_action("NONE because nothing to do"), Ok(Action::None));
    }

    #[test]
    fn test_parse_rejects_unknown_kind() {
        assert_eq!(
            parse_action(""),
            Err(DecisionError::UnknownActionKind(String::new()))
        );
        assert_eq!(
            parse_action("FOO"),
            Err(DecisionError::UnknownActionKind("FOO".to_string()))
        );
        // 关键字区分大小写
        assert!(matches!(
            parse_action("click_element 1"),
            Err(DecisionError::UnknownActionKind(_))
        ));
    }

    #[test]
    fn test_parse_rejects_malformed_arguments() {
        for reply in [
            "CLICK_ELEMENT",
            "CLICK_ELEMENT abc",
            "CLICK_ELEMENT 1 2",
            "MOVE_COORDS 1",
            "MOVE_COORDS 1 x",
            "CLICK_COORDS 1 2 3",
            "CLICK_COORDS -1 5",
        ] {
            assert!(
                matches!(
                    parse_action(reply),
                    Err(DecisionError::MalformedArguments { .. })
                ),
                "{reply} should be rejected"
            );
        }
    }

    #[test]
    fn test_malformed_error_names_kind() {
        match parse_action("MOVE_COORDS 1") {
            Err(DecisionError::MalformedArguments { kind, .. }) => {
                assert_eq!(kind, ActionKind::MoveCoords)
            }
            other => panic!("Expected MalformedArguments, got {:?}", other),
        }
    }

    #[test]
    fn test_display_matches_parse() {
        let action = Action::ClickCoords { x: 12, y: 80 };
        assert_eq!(action.to_string(), "CLICK_COORDS 12 80");
        assert_eq!(action.to_string().parse::<Action>(), Ok(action));
    }

    #[test]
    fn test_check_bounds() {
        let limits = ScreenLimits {
            screen_width: 160,
            screen_height: 210,
        };
        assert!(Action::MoveCoords { x: 160, y: 210 }.check_bounds(&limits).is_ok());
        assert!(Action::ClickCoords { x: 161, y: 0 }.check_bounds(&limits).is_err());
        assert!(Action::ClickElement { element_ref: 9999 }.check_bounds(&limits).is_ok());
    }

    #[test]
    fn test_action_wire_format() {
        let json = serde_json::to_value(Action::ClickElement { element_ref: 5 }).unwrap();
        assert_eq!(json, serde_json::json!({"kind": "CLICK_ELEMENT", "ref": 5}));
        let json = serde_json::to_value(Action::None).unwrap();
        assert_eq!(json, serde_json::json!({"kind": "NONE"}));
    }
}
