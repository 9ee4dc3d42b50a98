use crate::error::DispatchError;
use std::io;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::{Arc, Mutex};

/// Placeholder substituted with the destination topic.
pub const TOPIC_PLACEHOLDER: &str = "{topic}";
/// Placeholder substituted with the message type name.
pub const TYPE_PLACEHOLDER: &str = "{type}";
/// Placeholder substituted with the serialized goal.
pub const PAYLOAD_PLACEHOLDER: &str = "{payload}";

/// Anything able to place one message on a named topic.
pub trait TransportClient: Send + Sync {
    /// Start a one-shot publish. Returning `Ok` means the publish was launched,
    /// not that any subscriber received it.
    fn publish_once(
        &self,
        topic: &str,
        message_type: &str,
        payload: &str,
    ) -> Result<(), DispatchError>;
}

/// Where the publisher's stdout/stderr go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputSink {
    /// Share the caller's terminal.
    Inherit,
    /// Drop all output; used while a full-screen UI owns the terminal.
    Discard,
}

impl OutputSink {
    fn stdio(self) -> Stdio {
        match self {
            OutputSink::Inherit => Stdio::inherit(),
            OutputSink::Discard => Stdio::null(),
        }
    }
}

/// Publishes by spawning an external command built from an argv template.
#[derive(Debug, Clone)]
pub struct ProcessTransport {
    template: Vec<String>,
    output: OutputSink,
}

impl ProcessTransport {
    pub fn new(template: Vec<String>) -> Self {
        Self {
            template,
            output: OutputSink::Inherit,
        }
    }

    pub fn with_output(mut self, output: OutputSink) -> Self {
        self.output = output;
        self
    }

    pub fn template(&self) -> &[String] {
        &self.template
    }

    /// Expand the template into a concrete argv. The payload stays a single
    /// argument; no shell is involved.
    pub fn render_argv(
        &self,
        topic: &str,
        message_type: &str,
        payload: &str,
    ) -> Result<Vec<String>, DispatchError> {
        if self.template.first().map_or(true, |p| p.trim().is_empty()) {
            return Err(DispatchError::InvalidTemplate(
                "command template is empty".into(),
            ));
        }
        Ok(self
            .template
            .iter()
            .map(|arg| {
                arg.replace(TOPIC_PLACEHOLDER, topic)
                    .replace(TYPE_PLACEHOLDER, message_type)
                    .replace(PAYLOAD_PLACEHOLDER, payload)
            })
            .collect())
    }
}

impl TransportClient for ProcessTransport {
    fn publish_once(
        &self,
        topic: &str,
        message_type: &str,
        payload: &str,
    ) -> Result<(), DispatchError> {
        let argv = self.render_argv(topic, message_type, payload)?;
        let program = &argv[0];

        let child = Command::new(program)
            .args(&argv[1..])
            .stdin(Stdio::null())
            .stdout(self.output.stdio())
            .stderr(self.output.stdio())
            .spawn()
            .map_err(|e| DispatchError::LaunchFailure(format!("{program}: {e}")))?;

        let pid = child.id();
        tracing::info!(pid, program = %program, topic, "publisher launched");

        reap_detached(child, program.clone(), spawn_named);
        Ok(())
    }
}

type ThreadSpawner = fn(String, Box<dyn FnOnce() + Send>) -> io::Result<()>;

fn spawn_named(name: String, f: Box<dyn FnOnce() + Send>) -> io::Result<()> {
    std::thread::Builder::new().name(name).spawn(f).map(drop)
}

/// Wait for `child` on a detached thread so a finished publisher never lingers
/// as a zombie. When no thread can be started the wait happens inline and its
/// status is returned; otherwise returns `None`.
fn reap_detached(child: Child, program: String, spawn: ThreadSpawner) -> Option<ExitStatus> {
    let pid = child.id();
    let slot = Arc::new(Mutex::new(Some(child)));

    let shared = Arc::clone(&slot);
    let thread_program = program.clone();
    let spawned = spawn(
        format!("reap-{pid}"),
        Box::new(move || {
            let taken = shared.lock().ok().and_then(|mut c| c.take());
            if let Some(mut child) = taken {
                log_exit(pid, &thread_program, &child.wait());
            }
        }),
    );

    let Err(e) = spawned else {
        return None;
    };
    tracing::warn!(pid, "failed to spawn reaper thread, waiting inline: {e}");
    let taken = slot.lock().ok().and_then(|mut c| c.take());
    let mut child = taken?;
    let status = child.wait();
    log_exit(pid, &program, &status);
    status.ok()
}

fn log_exit(pid: u32, program: &str, status: &io::Result<ExitStatus>) {
    match status {
        Ok(status) if status.success() => {
            tracing::debug!(pid, program, "publisher exited");
        }
        Ok(status) => {
            tracing::warn!(pid, program, %status, "publisher exited with failure");
        }
        Err(e) => {
            tracing::warn!(pid, program, "failed to wait for publisher: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn placeholders_are_expanded_per_argument() {
        let t = ProcessTransport::new(argv(&[
            "rostopic", "pub", "-1", "{topic}", "{type}", "{payload}",
        ]));
        let out = t
            .render_argv("/navigate_to_goal/goal", "pkg/Type", "goal:\n  a: 'b c'")
            .unwrap();
        assert_eq!(
            out,
            argv(&[
                "rostopic",
                "pub",
                "-1",
                "/navigate_to_goal/goal",
                "pkg/Type",
                "goal:\n  a: 'b c'",
            ])
        );
    }

    #[test]
    fn placeholders_inside_larger_arguments() {
        let t = ProcessTransport::new(argv(&["pub", "--to={topic}"]));
        assert_eq!(
            t.render_argv("/t", "x", "p").unwrap(),
            argv(&["pub", "--to=/t"])
        );
    }

    #[test]
    fn empty_template_is_rejected() {
        let t = ProcessTransport::new(Vec::new());
        assert!(matches!(
            t.publish_once("/t", "x", "p"),
            Err(DispatchError::InvalidTemplate(_))
        ));
        let t = ProcessTransport::new(argv(&["  "]));
        assert!(matches!(
            t.render_argv("/t", "x", "p"),
            Err(DispatchError::InvalidTemplate(_))
        ));
    }

    #[test]
    fn missing_binary_is_a_launch_failure() {
        let t = ProcessTransport::new(argv(&["/nonexistent/nav-goal-publisher", "{payload}"]));
        match t.publish_once("/t", "x", "p") {
            Err(DispatchError::LaunchFailure(reason)) => {
                assert!(reason.contains("/nonexistent/nav-goal-publisher"));
            }
            other => panic!("expected launch failure, got {other:?}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn launching_an_existing_binary_succeeds() {
        let t = ProcessTransport::new(argv(&["echo", "{topic}", "{payload}"]))
            .with_output(OutputSink::Discard);
        assert!(t.publish_once("/t", "x", "p").is_ok());
    }

    #[cfg(unix)]
    #[test]
    fn non_zero_exit_still_counts_as_launched() {
        let t = ProcessTransport::new(argv(&["false"]));
        assert!(t.publish_once("/t", "x", "p").is_ok());
    }

    #[cfg(unix)]
    #[test]
    fn child_is_reaped_inline_when_no_thread_can_start() {
        fn refuse(_: String, _: Box<dyn FnOnce() + Send>) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::WouldBlock, "thread limit reached"))
        }
        let child = Command::new("true").spawn().unwrap();
        let status = reap_detached(child, "true".into(), refuse);
        assert!(status.is_some_and(|s| s.success()));
    }

    #[cfg(unix)]
    #[test]
    fn child_is_reaped_on_the_detached_thread() {
        let child = Command::new("true").spawn().unwrap();
        assert!(reap_detached(child, "true".into(), spawn_named).is_none());
    }
}
