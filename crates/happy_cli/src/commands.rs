//! Line parsing for the interactive prompt.
//!
//! Plain text is an utterance; a leading `/` selects a command.

use happy_core::{FaceEvent, PerceptionEvent};
use happy_orchestrator::Input;

#[derive(Debug, Clone, PartialEq)]
pub enum ReplCommand {
    /// Deliver something to the orchestrator.
    Send(Vec<Input>),
    Status,
    Help,
    Quit,
    Unknown(String),
}

pub const HELP: &str = "\
Type anything to talk to Happy. Commands:
  /face <emotion> [person]   simulate a face recognition result
  /meditate                  start meditating
  /breathe [pattern]         start a breathing exercise (4-7-8, 4-4-4, ...)
  /stop                      stop meditation and breathing
  /fail [reason]             simulate a recognition failure
  /clear                     clear all messages
  /status                    print the current state as JSON
  /quit                      leave";

/// Parse one prompt line. Blank lines yield `None`.
pub fn parse(line: &str, default_pattern: &str) -> Option<ReplCommand> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    let Some(rest) = line.strip_prefix('/') else {
        return Some(ReplCommand::Send(vec![Input::Perception(
            PerceptionEvent::Utterance(line.to_string()),
        )]));
    };

    let mut parts = rest.split_whitespace();
    let name = parts.next().unwrap_or_default().to_lowercase();
    let args: Vec<&str> = parts.collect();

    let command = match name.as_str() {
        "face" => match args.as_slice() {
            [] => ReplCommand::Unknown("usage: /face <emotion> [person]".to_string()),
            [emotion] => face(emotion, None),
            [emotion, person @ ..] => face(emotion, Some(person.join(" "))),
        },
        "meditate" => ReplCommand::Send(vec![Input::StartMeditation]),
        "breathe" => {
            let pattern = args.first().copied().unwrap_or(default_pattern);
            ReplCommand::Send(vec![Input::StartBreathing(pattern.to_string())])
        }
        "stop" => ReplCommand::Send(vec![Input::StopMeditation, Input::StopBreathing]),
        "fail" => {
            let reason = if args.is_empty() {
                "simulated failure".to_string()
            } else {
                args.join(" ")
            };
            ReplCommand::Send(vec![Input::Perception(PerceptionEvent::Failure(reason))])
        }
        "clear" => ReplCommand::Send(vec![Input::ClearMessages]),
        "status" => ReplCommand::Status,
        "help" | "?" => ReplCommand::Help,
        "quit" | "exit" => ReplCommand::Quit,
        other => ReplCommand::Unknown(format!("unknown command: /{other}")),
    };
    Some(command)
}

fn face(emotion: &str, person: Option<String>) -> ReplCommand {
    let event = FaceEvent::new(emotion, person.as_deref());
    ReplCommand::Send(vec![Input::Perception(PerceptionEvent::Face(event))])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_utterance() {
        assert_eq!(
            parse("  I feel better ", "4-7-8"),
            Some(ReplCommand::Send(vec![Input::Perception(
                PerceptionEvent::Utterance("I feel better".into())
            )]))
        );
        assert_eq!(parse("   ", "4-7-8"), None);
    }

    #[test]
    fn test_face_command() {
        let Some(ReplCommand::Send(inputs)) = parse("/face happy Mary Jane", "4-7-8") else {
            panic!("expected a send");
        };
        match &inputs[0] {
            Input::Perception(PerceptionEvent::Face(event)) => {
                assert_eq!(event.emotion.as_deref(), Some("happy"));
                assert_eq!(event.known_person(), Some("Mary Jane"));
            }
            other => panic!("unexpected input {other:?}"),
        }
        assert!(matches!(parse("/face", "4-7-8"), Some(ReplCommand::Unknown(_))));
    }

    #[test]
    fn test_breathe_uses_default_pattern() {
        assert_eq!(
            parse("/breathe", "4-4-4"),
            Some(ReplCommand::Send(vec![Input::StartBreathing("4-4-4".into())]))
        );
        assert_eq!(
            parse("/BREATHE 4-7-8", "4-4-4"),
            Some(ReplCommand::Send(vec![Input::StartBreathing("4-7-8".into())]))
        );
    }

    #[test]
    fn test_misc_commands() {
        assert_eq!(parse("/status", ""), Some(ReplCommand::Status));
        assert_eq!(parse("/quit", ""), Some(ReplCommand::Quit));
        assert_eq!(
            parse("/stop", ""),
            Some(ReplCommand::Send(vec![Input::StopMeditation, Input::StopBreathing]))
        );
        assert!(matches!(parse("/dance", ""), Some(ReplCommand::Unknown(_))));
    }
}
