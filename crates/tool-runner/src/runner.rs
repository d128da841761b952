//! 서브프로세스 실행기 — 타임아웃과 프로세스 그룹 취소
//!
//! [`SystemToolRunner`]는 [`ToolRunner`] 포트의 실제 구현입니다.
//! 도구는 자기 프로세스 그룹의 리더로 실행되며, 타임아웃이나 취소 시
//! 그룹 전체에 시그널을 보내 자식 프로세스까지 함께 종료합니다.
//! 중단된 실행도 그때까지 수집된 부분 출력을 담아 반환합니다.

use std::process::Stdio;
use std::time::{Duration, Instant};

use tokio::process::Command;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use pentora_core::error::ExecError;
use pentora_core::metrics as metric_names;
use pentora_core::ports::ToolRunner;
use pentora_core::types::{CommandSpec, RawResult};

/// SIGTERM 후 SIGKILL까지의 유예 시간
const TERM_GRACE: Duration = Duration::from_secs(2);

/// 실제 시스템 도구를 실행하는 러너
#[derive(Debug, Clone, Default)]
pub struct SystemToolRunner;

impl SystemToolRunner {
    pub fn new() -> Self {
        Self
    }
}

impl ToolRunner for SystemToolRunner {
    async fn execute(
        &self,
        spec: CommandSpec,
        timeout: Duration,
        cancel: CancellationToken,
    ) -> Result<RawResult, ExecError> {
        let started = Instant::now();
        debug!(
            tool = %spec.tool,
            command = %spec.display_line(),
            timeout_secs = timeout.as_secs(),
            "launching tool"
        );

        let mut cmd = Command::new(&spec.program);
        cmd.args(&spec.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        #[cfg(unix)]
        cmd.process_group(0);

        let child = cmd.spawn().map_err(|e| ExecError::Launch {
            program: spec.program.clone(),
            reason: e.to_string(),
        })?;
        // process_group(0)으로 생성했으므로 pgid == 자식 pid
        let pgid = child.id().map(|id| id as i32);

        let wait = child.wait_with_output();
        tokio::pin!(wait);

        let mut timed_out = false;
        let mut cancelled = false;
        let output = tokio::select! {
            res = &mut wait => res,
            () = tokio::time::sleep(timeout) => {
                timed_out = true;
                terminate_group(pgid, &spec, &mut wait).await
            }
            () = cancel.cancelled() => {
                cancelled = true;
                terminate_group(pgid, &spec, &mut wait).await
            }
        };

        let output = output.map_err(|e| ExecError::Wait {
            program: spec.program.clone(),
            reason: e.to_string(),
        })?;

        let duration = started.elapsed();
        metrics::histogram!(
            metric_names::TOOL_EXEC_DURATION_SECONDS,
            metric_names::LABEL_TOOL => spec.tool.as_str(),
        )
        .record(duration.as_secs_f64());

        let result = RawResult {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            exit_code: output.status.code(),
            timed_out,
            cancelled,
            duration,
        };
        debug!(
            tool = %spec.tool,
            exit_code = ?result.exit_code,
            timed_out,
            cancelled,
            duration_ms = duration.as_millis() as u64,
            "tool finished"
        );
        Ok(result)
    }
}

/// 프로세스 그룹에 SIGTERM을 보내고, 유예 시간 내에 종료하지 않으면
/// SIGKILL로 강제 종료한 뒤 최종 출력을 수집합니다.
async fn terminate_group<F>(
    pgid: Option<i32>,
    spec: &CommandSpec,
    wait: &mut std::pin::Pin<&mut F>,
) -> std::io::Result<std::process::Output>
where
    F: std::future::Future<Output = std::io::Result<std::process::Output>>,
{
    if let Some(pgid) = pgid {
        if let Err(e) = signal_group(pgid, TERM_SIGNAL) {
            warn!(tool = %spec.tool, pgid, error = %e, "failed to send SIGTERM to process group");
        }
        tokio::select! {
            res = wait.as_mut() => return res,
            () = tokio::time::sleep(TERM_GRACE) => {
                if let Err(e) = signal_group(pgid, KILL_SIGNAL) {
                    warn!(tool = %spec.tool, pgid, error = %e, "failed to send SIGKILL to process group");
                }
            }
        }
    }
    wait.as_mut().await
}

#[cfg(unix)]
const TERM_SIGNAL: i32 = libc::SIGTERM;
#[cfg(unix)]
const KILL_SIGNAL: i32 = libc::SIGKILL;
#[cfg(not(unix))]
const TERM_SIGNAL: i32 = 15;
#[cfg(not(unix))]
const KILL_SIGNAL: i32 = 9;

/// 프로세스 그룹 전체에 시그널을 보냅니다.
#[cfg(unix)]
fn signal_group(pgid: i32, signal: i32) -> Result<(), ExecError> {
    // SAFETY: kill(2)은 포인터를 받지 않는 단순 시스템 콜입니다.
    let rc = unsafe { libc::kill(-pgid, signal) };
    if rc == 0 {
        return Ok(());
    }
    let err = std::io::Error::last_os_error();
    // 그룹이 이미 사라진 경우(ESRCH)는 성공으로 간주
    if err.raw_os_error() == Some(libc::ESRCH) {
        return Ok(());
    }
    Err(ExecError::Terminate {
        pgid,
        reason: err.to_string(),
    })
}

#[cfg(not(unix))]
fn signal_group(_pgid: i32, _signal: i32) -> Result<(), ExecError> {
    Ok(())
}
