//! The text dispatcher: picks a transform by program name and signs the result.
//!
//! Everything here works on `core::fmt::Write` so the guest plugin can stream
//! the same output without an allocator. [`run`] is the allocating wrapper.

use alloc::string::String;
use core::fmt::{self, Write};

/// Marker appended to every result, recognised program or not.
pub const SIGN: &str = " by gossi";

/// A transform selected by exact, case-sensitive program name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Program {
    Echo,
    Uppercase,
    Lowercase,
    /// Any other name. Produces no text before the sign.
    Unknown,
}

impl Program {
    pub const KNOWN: [Program; 3] = [Program::Echo, Program::Uppercase, Program::Lowercase];

    pub fn parse(name: &str) -> Self {
        match name {
            "echo" => Program::Echo,
            "uppercase" => Program::Uppercase,
            "lowercase" => Program::Lowercase,
            _ => Program::Unknown,
        }
    }

    pub fn name(self) -> Option<&'static str> {
        match self {
            Program::Echo => Some("echo"),
            Program::Uppercase => Some("uppercase"),
            Program::Lowercase => Some("lowercase"),
            Program::Unknown => None,
        }
    }

    /// Writes the transformed `data` (without the sign) into `out`.
    pub fn apply<W: Write + ?Sized>(self, data: &str, out: &mut W) -> fmt::Result {
        match self {
            Program::Echo => out.write_str(data),
            Program::Uppercase => data
                .chars()
                .flat_map(char::to_uppercase)
                .try_for_each(|c| out.write_char(c)),
            Program::Lowercase => data
                .chars()
                .flat_map(char::to_lowercase)
                .try_for_each(|c| out.write_char(c)),
            Program::Unknown => Ok(()),
        }
    }
}

impl From<&str> for Program {
    fn from(name: &str) -> Self {
        Program::parse(name)
    }
}

/// Streams `transform(data) + SIGN` into `out`.
pub fn write_run<W: Write + ?Sized>(program: &str, data: &str, out: &mut W) -> fmt::Result {
    Program::parse(program).apply(data, out)?;
    out.write_str(SIGN)
}

/// Runs `program` over `data` and returns the signed result. Never fails.
pub fn run(program: &str, data: &str) -> String {
    let mut out = String::with_capacity(data.len() + SIGN.len());
    // fmt::Write for String is infallible
    let _ = write_run(program, data, &mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn test_concrete_scenarios() {
        assert_eq!(run("echo", "hello"), "hello by gossi");
        assert_eq!(run("uppercase", "hello"), "HELLO by gossi");
        assert_eq!(run("lowercase", "HELLO"), "hello by gossi");
        assert_eq!(run("reverse", "hello"), " by gossi");
        assert_eq!(run("echo", ""), " by gossi");
        assert_eq!(run("Echo", "hi"), " by gossi");
    }

    #[test]
    fn test_unknown_programs_yield_sign_only() {
        for program in ["", "ECHO", "upper", " echo", "lowercase ", "rot13"] {
            assert_eq!(run(program, "some data"), SIGN, "program {:?}", program);
        }
    }

    #[test]
    fn test_sign_is_not_idempotent() {
        let once = run("echo", "x");
        let twice = run("echo", &once);
        assert_eq!(twice, "x by gossi by gossi");
        assert_ne!(twice, once);
    }

    #[test]
    fn test_case_mapping_matches_std_for_mixed_input() {
        let data = "Hello, Wörld! straße 123";
        assert_eq!(run("uppercase", data), data.to_uppercase() + SIGN);
        assert_eq!(run("lowercase", data), data.to_lowercase() + SIGN);
    }

    #[test]
    fn test_program_names() {
        for program in Program::KNOWN {
            let name = program.name().unwrap();
            assert_eq!(Program::parse(name), program);
        }
        assert_eq!(Program::from("Uppercase"), Program::Unknown);
        assert_eq!(Program::Unknown.name(), None);
    }

    #[test]
    fn test_write_run_propagates_writer_errors() {
        struct Full;
        impl Write for Full {
            fn write_str(&mut self, _: &str) -> fmt::Result {
                Err(fmt::Error)
            }
        }
        assert!(write_run("echo", "abc", &mut Full).is_err());

        let mut out = "prefix:".to_string();
        write_run("uppercase", "abc", &mut out).unwrap();
        assert_eq!(out, "prefix:ABC by gossi");
    }
}
