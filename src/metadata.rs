/*!
Meta-data loader: parses the program description stream into PCBs.

Format
- The stream is wrapped by the literal lines
  `Start Program Meta-Data Code:` and `End Program Meta-Data Code.`.
- Between them, operation tokens `type(descriptor)cycles` separated by
  `;`, with `.` terminating the final token. Whitespace and line breaks
  between tokens are insignificant.
- The token stream must begin with `S(start)0` and end with `S(end)0`;
  each program is delimited by `A(start)0 .. A(end)0`.

Every token is validated: operation type, descriptor, type/descriptor
compatibility, and the zero-cycle rule for boundary tokens. Cycle times
are resolved from the configuration while programs are built, so the
scheduler never consults the config per operation.

`serialize` renders a token list back into the file format; parsing a
stream and re-serialising it yields an equivalent token sequence.
*/

use std::fmt;
use std::fs;
use std::path::Path;

use crate::config::Config;
use crate::error::MetaDataError;
use crate::operation::{Descriptor, OpKind, Operation};
use crate::program::Program;

pub const HEADER: &str = "Start Program Meta-Data Code:";
pub const FOOTER: &str = "End Program Meta-Data Code.";

/// A raw meta-data token, before cycle times are resolved.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Token {
    pub kind: OpKind,
    pub descriptor: Descriptor,
    pub cycles: u32,
}

impl Token {
    #[inline]
    fn is(self, kind: OpKind, descriptor: Descriptor) -> bool {
        self.kind == kind && self.descriptor == descriptor
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({}){}", self.kind.code(), self.descriptor, self.cycles)
    }
}

/// Load programs from a meta-data file.
pub fn load<P: AsRef<Path>>(path: P, config: &Config) -> Result<Vec<Program>, MetaDataError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| MetaDataError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse(&text, config)
}

/// Parse meta-data text into programs, resolving cycle times from the
/// configuration.
pub fn parse(text: &str, config: &Config) -> Result<Vec<Program>, MetaDataError> {
    let tokens = tokenize(text)?;
    build_programs(&tokens, config)
}

/// Split meta-data text into validated tokens.
pub fn tokenize(text: &str) -> Result<Vec<Token>, MetaDataError> {
    let text = text.trim();
    let after_header = text
        .strip_prefix(HEADER)
        .ok_or(MetaDataError::MissingHeader)?;
    let stream = after_header
        .trim_end()
        .strip_suffix(FOOTER)
        .ok_or(MetaDataError::MissingFooter)?
        .trim();

    // The final token is terminated by `.` instead of `;`.
    let body = stream
        .strip_suffix('.')
        .ok_or(MetaDataError::MissingSimEnd)?;

    body.split(';').map(|raw| parse_token(raw.trim())).collect()
}

/// Render tokens back into the meta-data file format.
pub fn serialize(tokens: &[Token]) -> String {
    let mut stream = String::new();
    for (i, token) in tokens.iter().enumerate() {
        if i > 0 {
            stream.push_str("; ");
        }
        stream.push_str(&token.to_string());
    }
    format!("{HEADER}\n{stream}.\n{FOOTER}\n")
}

fn parse_token(raw: &str) -> Result<Token, MetaDataError> {
    let malformed = || MetaDataError::MalformedToken(raw.to_string());

    let open = raw.find('(').ok_or_else(malformed)?;
    let close = raw.rfind(')').ok_or_else(malformed)?;
    if close < open {
        return Err(malformed());
    }

    let type_str = raw[..open].trim();
    let mut type_chars = type_str.chars();
    let code = match (type_chars.next(), type_chars.next()) {
        (Some(c), None) => c,
        _ => return Err(malformed()),
    };
    let kind = OpKind::from_code(code).ok_or(MetaDataError::UnknownOpType(code))?;

    let descriptor_str = raw[open + 1..close].trim();
    let descriptor = Descriptor::parse(descriptor_str)
        .ok_or_else(|| MetaDataError::UnknownDescriptor(descriptor_str.to_string()))?;

    let cycles_str = raw[close + 1..].trim();
    let cycles: u32 = cycles_str
        .parse()
        .map_err(|_| MetaDataError::BadCycleCount(raw.to_string()))?;

    let compatible = match kind {
        OpKind::SimBoundary | OpKind::AppBoundary => {
            matches!(descriptor, Descriptor::Start | Descriptor::End)
        }
        OpKind::Process => descriptor == Descriptor::Run,
        OpKind::Input => matches!(descriptor, Descriptor::HardDrive | Descriptor::Keyboard),
        OpKind::Output => matches!(
            descriptor,
            Descriptor::HardDrive | Descriptor::Monitor | Descriptor::Printer
        ),
    };
    if !compatible {
        return Err(MetaDataError::IncompatibleDescriptor {
            kind: code,
            descriptor: descriptor_str.to_string(),
        });
    }
    if kind.is_boundary() && cycles != 0 {
        return Err(MetaDataError::BoundaryCycles(raw.to_string()));
    }

    Ok(Token {
        kind,
        descriptor,
        cycles,
    })
}

/// Group a validated token stream into programs, enforcing the sentinel
/// and delimiter structure.
fn build_programs(tokens: &[Token], config: &Config) -> Result<Vec<Program>, MetaDataError> {
    let first = tokens.first().ok_or(MetaDataError::MissingSimStart)?;
    if !first.is(OpKind::SimBoundary, Descriptor::Start) {
        return Err(MetaDataError::MissingSimStart);
    }
    let last = tokens.last().ok_or(MetaDataError::MissingSimEnd)?;
    if !last.is(OpKind::SimBoundary, Descriptor::End) || tokens.len() < 2 {
        return Err(MetaDataError::MissingSimEnd);
    }

    let mut programs = Vec::new();
    let mut current: Option<Program> = None;

    for token in &tokens[1..tokens.len() - 1] {
        match token.kind {
            // Descriptor compatibility is already validated, so an
            // AppBoundary token is exactly `start` or `end`.
            OpKind::AppBoundary if token.descriptor == Descriptor::Start => {
                if current.is_some() {
                    return Err(MetaDataError::UnterminatedProgram);
                }
                let mut program = Program::new();
                program.enqueue(resolve(token, config));
                current = Some(program);
            }
            OpKind::AppBoundary => match current.take() {
                Some(mut program) => {
                    program.enqueue(resolve(token, config));
                    programs.push(program);
                }
                None => return Err(MetaDataError::TokenOutsideProgram(token.to_string())),
            },
            OpKind::SimBoundary => {
                return Err(if current.is_some() {
                    MetaDataError::UnterminatedProgram
                } else {
                    MetaDataError::TokenOutsideProgram(token.to_string())
                });
            }
            OpKind::Process | OpKind::Input | OpKind::Output => match current.as_mut() {
                Some(program) => program.enqueue(resolve(token, config)),
                None => return Err(MetaDataError::TokenOutsideProgram(token.to_string())),
            },
        }
    }

    if current.is_some() {
        return Err(MetaDataError::UnterminatedProgram);
    }
    Ok(programs)
}

fn resolve(token: &Token, config: &Config) -> Operation {
    Operation::new(
        token.kind,
        token.descriptor,
        token.cycles,
        config.cycle_time_for(token.kind, token.descriptor),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Policy;
    use crate::test_utils::{meta_text, test_config};

    #[test]
    fn parses_a_two_program_batch() {
        let config = test_config(Policy::Fifo, 10);
        let text = meta_text(&["P(run)3", "I(keyboard)2; P(run)1"]);
        let programs = parse(&text, &config).expect("parse");

        assert_eq!(programs.len(), 2);

        // First program: A(start), P(run)3, A(end).
        assert_eq!(programs[0].remaining_ops(), 3);
        assert_eq!(
            programs[0].remaining_burst_ms(),
            3 * config.processor_cycle_ms
        );

        // Second program: A(start), I(keyboard)2, P(run)1, A(end).
        assert_eq!(programs[1].remaining_ops(), 4);
        assert_eq!(
            programs[1].remaining_burst_ms(),
            2 * config.keyboard_cycle_ms + config.processor_cycle_ms
        );
    }

    #[test]
    fn boundary_operations_frame_every_program() {
        let config = test_config(Policy::Fifo, 10);
        let text = meta_text(&["P(run)1"]);
        let mut programs = parse(&text, &config).expect("parse");
        let program = &mut programs[0];

        let front = program.front().unwrap();
        assert_eq!(front.kind, OpKind::AppBoundary);
        assert_eq!(front.descriptor, Descriptor::Start);

        let mut last = None;
        while let Some(op) = program.pop_next() {
            last = Some(op);
        }
        let last = last.unwrap();
        assert_eq!(last.kind, OpKind::AppBoundary);
        assert_eq!(last.descriptor, Descriptor::End);
    }

    #[test]
    fn whitespace_between_tokens_is_insignificant() {
        let config = test_config(Policy::Fifo, 10);
        let text = format!(
            "{HEADER}\nS(start)0;\n  A(start)0 ;P(run)2;\n\nA(end)0; S(end)0.\n{FOOTER}\n"
        );
        let programs = parse(&text, &config).expect("parse");
        assert_eq!(programs.len(), 1);
        assert_eq!(programs[0].remaining_ops(), 3);
    }

    #[test]
    fn missing_sim_start_is_rejected() {
        let config = test_config(Policy::Fifo, 10);
        let text = format!("{HEADER}\nA(start)0; P(run)1; A(end)0; S(end)0.\n{FOOTER}\n");
        assert!(matches!(
            parse(&text, &config),
            Err(MetaDataError::MissingSimStart)
        ));
    }

    #[test]
    fn missing_sim_end_is_rejected() {
        let config = test_config(Policy::Fifo, 10);
        // No `.` terminator on the final token.
        let text = format!("{HEADER}\nS(start)0; A(start)0; A(end)0; S(end)0\n{FOOTER}\n");
        assert!(matches!(
            parse(&text, &config),
            Err(MetaDataError::MissingSimEnd)
        ));
    }

    #[test]
    fn missing_header_and_footer_are_rejected() {
        assert!(matches!(
            tokenize("S(start)0; S(end)0."),
            Err(MetaDataError::MissingHeader)
        ));
        assert!(matches!(
            tokenize(&format!("{HEADER}\nS(start)0; S(end)0.")),
            Err(MetaDataError::MissingFooter)
        ));
    }

    #[test]
    fn unknown_op_type_is_rejected() {
        let text = meta_text(&["X(run)3"]);
        match tokenize(&text) {
            Err(MetaDataError::UnknownOpType(c)) => assert_eq!(c, 'X'),
            other => panic!("expected UnknownOpType, got {other:?}"),
        }
    }

    #[test]
    fn unknown_descriptor_is_rejected() {
        let text = meta_text(&["I(tape drive)3"]);
        match tokenize(&text) {
            Err(MetaDataError::UnknownDescriptor(d)) => assert_eq!(d, "tape drive"),
            other => panic!("expected UnknownDescriptor, got {other:?}"),
        }
    }

    #[test]
    fn incompatible_descriptor_is_rejected() {
        // Keyboard is an input-only device.
        let text = meta_text(&["O(keyboard)3"]);
        assert!(matches!(
            tokenize(&text),
            Err(MetaDataError::IncompatibleDescriptor { kind: 'O', .. })
        ));

        let text = meta_text(&["I(run)3"]);
        assert!(matches!(
            tokenize(&text),
            Err(MetaDataError::IncompatibleDescriptor { kind: 'I', .. })
        ));
    }

    #[test]
    fn non_integer_cycles_are_rejected() {
        let text = meta_text(&["P(run)x"]);
        assert!(matches!(
            tokenize(&text),
            Err(MetaDataError::BadCycleCount(_))
        ));
    }

    #[test]
    fn boundary_tokens_with_cycles_are_rejected() {
        let config = test_config(Policy::Fifo, 10);
        let text = format!("{HEADER}\nS(start)0; A(start)2; A(end)0; S(end)0.\n{FOOTER}\n");
        assert!(matches!(
            parse(&text, &config),
            Err(MetaDataError::BoundaryCycles(_))
        ));
    }

    #[test]
    fn operations_outside_a_program_are_rejected() {
        let config = test_config(Policy::Fifo, 10);
        let text = format!("{HEADER}\nS(start)0; P(run)3; S(end)0.\n{FOOTER}\n");
        assert!(matches!(
            parse(&text, &config),
            Err(MetaDataError::TokenOutsideProgram(_))
        ));
    }

    #[test]
    fn unterminated_program_is_rejected() {
        let config = test_config(Policy::Fifo, 10);
        let text = format!("{HEADER}\nS(start)0; A(start)0; P(run)3; S(end)0.\n{FOOTER}\n");
        assert!(matches!(
            parse(&text, &config),
            Err(MetaDataError::UnterminatedProgram)
        ));

        // A nested A(start) is just as unterminated.
        let text =
            format!("{HEADER}\nS(start)0; A(start)0; A(start)0; A(end)0; S(end)0.\n{FOOTER}\n");
        assert!(matches!(
            parse(&text, &config),
            Err(MetaDataError::UnterminatedProgram)
        ));
    }

    #[test]
    fn empty_batch_parses_to_no_programs() {
        let config = test_config(Policy::Fifo, 10);
        let text = format!("{HEADER}\nS(start)0; S(end)0.\n{FOOTER}\n");
        let programs = parse(&text, &config).expect("parse");
        assert!(programs.is_empty());
    }

    #[test]
    fn tokens_round_trip_through_serialize() {
        let text = meta_text(&["P(run)3; O(monitor)2", "I(hard drive)5"]);
        let tokens = tokenize(&text).expect("tokenize");
        let rendered = serialize(&tokens);
        let reparsed = tokenize(&rendered).expect("re-tokenize");
        assert_eq!(tokens, reparsed);
    }
}
