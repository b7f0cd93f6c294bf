use crate::context::Context;
use crate::error::Error;
use crate::result::Result;
use std::ffi::OsStr;
use std::process::Command;

/// Run `program` with `args` (no shell) and capture its output.
///
/// A non-zero exit becomes [`Error::ExternalTool`] carrying stdout and stderr.
pub fn execute_with_output<S: AsRef<OsStr>>(ctx: &Context, program: &str, args: &[S]) -> Result<String> {
    let display_args: Vec<String> = args
        .iter()
        .map(|a| a.as_ref().to_string_lossy().into_owned())
        .collect();
    if ctx.verbose {
        log::info!("Executing: {} {}", program, display_args.join(" "));
    } else {
        log::debug!("Executing: {} {}", program, display_args.join(" "));
    }

    let output = Command::new(program).args(args).output()?;
    let stdout = String::from_utf8_lossy(&output.stdout).to_string();

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(Error::ExternalTool {
            program: program.to_string(),
            code: output.status.code().unwrap_or(-1),
            output: format!("{}{}", stdout, stderr),
        });
    }

    if ctx.verbose {
        for line in stdout.lines() {
            log::info!("{}", line);
        }
    }

    Ok(stdout)
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn captures_stdout() {
        let out = execute_with_output(&Context::default(), "sh", &["-c", "echo packed"]).expect("run");
        assert_eq!(out.trim(), "packed");
    }

    #[test]
    fn non_zero_exit_is_external_tool_error() {
        let result = execute_with_output(&Context::default(), "sh", &["-c", "echo bad nuspec >&2; exit 3"]);
        match result {
            Err(Error::ExternalTool { program, code, output }) => {
                assert_eq!(program, "sh");
                assert_eq!(code, 3);
                assert!(output.contains("bad nuspec"));
            }
            other => panic!("expected ExternalTool, got {other:?}"),
        }
    }

    #[test]
    fn arguments_are_not_shell_split() {
        let out = execute_with_output(&Context::default(), "sh", &["-c", "printf '%s' \"$0\"", "a path with spaces"])
            .expect("run");
        assert_eq!(out, "a path with spaces");
    }
}
