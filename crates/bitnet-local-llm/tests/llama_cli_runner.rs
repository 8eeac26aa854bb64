//! Runs the real subprocess path against stand-in `llama-cli` shell scripts.

#![cfg(unix)]

use bitnet_local_llm::{
    GenerationOutcome, GenerationRequest, InferenceConfig, InferenceError, InferenceMode,
    InferenceOrchestrator, LlamaCliRunner, ProcessRunner, ProofType, ProvenanceArtifact,
};
use std::io::Write;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tempfile::TempDir;

const NOISY_STDOUT: &str = "\
llama_model_loader: loaded meta data with 24 key-value pairs
main: build = 3001 (abc1234)
main: seed  = 1712345678
sampling: repeat_last_n = 64, repeat_penalty = 1.000
system_info: n_threads = 2 / 8 | AVX = 1 | AVX2 = 1

Paris is the capital of France.
";

fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).expect("write script");
    let mut perms = std::fs::metadata(&path).expect("metadata").permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(&path, perms).expect("chmod");
    path
}

fn write_model(dir: &Path) -> PathBuf {
    let path = dir.join("ggml-model-i2_s.gguf");
    std::fs::write(&path, b"GGUF").expect("write model");
    path
}

fn request(prompt: &str) -> GenerationRequest {
    GenerationRequest::new(prompt, &InferenceConfig::default())
}

fn runner(binary: &Path, timeout: Duration) -> LlamaCliRunner {
    LlamaCliRunner::new(binary, "/models/ggml-model-i2_s.gguf", timeout)
}

#[tokio::test]
async fn successful_run_returns_raw_stdout() {
    let dir = TempDir::new().unwrap();
    let script = write_script(
        dir.path(),
        "llama-cli",
        &format!("cat <<'EOF'\n{NOISY_STDOUT}EOF\necho 'llama_perf_context_print: load time' >&2"),
    );

    let outcome = runner(&script, Duration::from_secs(10))
        .run(&request("user: capital of France?"))
        .await;
    match outcome {
        GenerationOutcome::Success { text } => {
            assert!(text.contains("Paris is the capital of France."));
            assert!(text.contains("system_info"));
            assert!(!text.contains("llama_perf_context_print"));
        }
        other => panic!("expected success, got {other:?}"),
    }
}

#[tokio::test]
async fn arguments_arrive_as_an_unsplit_vector() {
    let dir = TempDir::new().unwrap();
    let args_file = dir.path().join("args.txt");
    let script = write_script(
        dir.path(),
        "llama-cli",
        &format!(
            "for a in \"$@\"; do printf '%s\\n' \"$a\"; done > '{}'\necho ok",
            args_file.display()
        ),
    );
    let prompt = "user: what does $(whoami) print? 'quoted' && ls; echo *";

    let outcome = runner(&script, Duration::from_secs(10))
        .run(&request(prompt).with_max_tokens(Some(12)))
        .await;
    assert!(outcome.is_success());

    let recorded = std::fs::read_to_string(&args_file).unwrap();
    let args: Vec<&str> = recorded.lines().collect();
    assert_eq!(
        args,
        vec![
            "-m",
            "/models/ggml-model-i2_s.gguf",
            "-p",
            prompt,
            "-n",
            "12",
            "-t",
            "2",
            "-c",
            "2048",
            "--temp",
            "0.8",
            "-ngl",
            "0",
            "-b",
            "1",
        ]
    );
}

#[tokio::test]
async fn nonzero_exit_carries_stderr() {
    let dir = TempDir::new().unwrap();
    let script = write_script(
        dir.path(),
        "llama-cli",
        "echo 'error: failed to load model' >&2\nexit 1",
    );

    let outcome = runner(&script, Duration::from_secs(10)).run(&request("hi")).await;
    match outcome {
        GenerationOutcome::Failure { reason } => {
            assert_eq!(
                reason,
                InferenceError::NonZeroExit {
                    code: Some(1),
                    stderr: "error: failed to load model".into(),
                }
            );
            assert_eq!(reason.to_string(), "nonzero_exit: error: failed to load model");
        }
        other => panic!("expected failure, got {other:?}"),
    }
}

#[tokio::test]
async fn non_executable_binary_is_spawn_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("llama-cli");
    std::fs::write(&path, "not a program").unwrap();

    let outcome = runner(&path, Duration::from_secs(10)).run(&request("hi")).await;
    match outcome {
        GenerationOutcome::Failure { reason } => {
            assert!(reason.to_string().starts_with("spawn_error: "), "{reason}");
        }
        other => panic!("expected spawn failure, got {other:?}"),
    }
}

#[tokio::test]
async fn large_output_does_not_block_on_pipe_buffer() {
    let dir = TempDir::new().unwrap();
    let script = write_script(
        dir.path(),
        "llama-cli",
        "head -c 300000 /dev/zero | tr '\\000' 'a'\necho\nhead -c 300000 /dev/zero | tr '\\000' 'b' >&2",
    );

    let outcome = runner(&script, Duration::from_secs(20)).run(&request("hi")).await;
    match outcome {
        GenerationOutcome::Success { text } => assert_eq!(text.trim_end().len(), 300_000),
        other => panic!("expected success, got {other:?}"),
    }
}

#[cfg(target_os = "linux")]
#[tokio::test]
async fn timeout_kills_and_reaps_the_child() {
    let dir = TempDir::new().unwrap();
    let pid_file = dir.path().join("pid");
    let script = write_script(
        dir.path(),
        "llama-cli",
        &format!("echo $$ > '{}'\nexec sleep 30", pid_file.display()),
    );
    let timeout = Duration::from_millis(500);

    let started = Instant::now();
    let outcome = runner(&script, timeout).run(&request("hang")).await;
    let elapsed = started.elapsed();

    assert_eq!(
        outcome,
        GenerationOutcome::Failure {
            reason: InferenceError::Timeout(timeout)
        }
    );
    assert_eq!(
        match &outcome {
            GenerationOutcome::Failure { reason } => reason.to_string(),
            _ => unreachable!(),
        },
        "timeout"
    );
    assert!(elapsed >= timeout, "returned early: {elapsed:?}");
    assert!(elapsed < timeout + Duration::from_secs(3), "returned late: {elapsed:?}");

    let pid = std::fs::read_to_string(&pid_file).expect("child wrote its pid");
    let proc_entry = PathBuf::from(format!("/proc/{}", pid.trim()));
    assert!(!proc_entry.exists(), "child {} still present", pid.trim());
}

#[tokio::test]
async fn orchestrator_cleans_real_process_output() {
    let dir = TempDir::new().unwrap();
    let model = write_model(dir.path());
    let script = write_script(
        dir.path(),
        "llama-cli",
        &format!("cat <<'EOF'\n{NOISY_STDOUT}EOF"),
    );
    let config = InferenceConfig::new(
        model.to_string_lossy().into_owned(),
        script.to_string_lossy().into_owned(),
    )
    .with_max_concurrency(1)
    .unwrap();

    let orchestrator = InferenceOrchestrator::new(config);
    assert!(orchestrator.availability().is_ready());

    let generation = orchestrator
        .generate(&request("user: What is the capital of France?"))
        .await;
    assert_eq!(generation.text, "Paris is the capital of France.");
    assert_eq!(generation.mode, InferenceMode::Succeeded);
    let artifact = ProvenanceArtifact::decode(&generation.proof).unwrap();
    assert_eq!(artifact.proof_type, ProofType::RealInference);
}

/// Captures formatted log output for assertions.
#[derive(Clone, Default)]
struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl LogBuffer {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

#[tokio::test]
async fn orchestrator_falls_back_and_logs_exit_code_on_crash() {
    let logs = LogBuffer::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let dir = TempDir::new().unwrap();
    let model = write_model(dir.path());
    let script = write_script(
        dir.path(),
        "llama-cli",
        "echo 'ggml_init: out of memory' >&2\nexit 1",
    );
    let config = InferenceConfig::new(
        model.to_string_lossy().into_owned(),
        script.to_string_lossy().into_owned(),
    );

    let orchestrator = InferenceOrchestrator::new(config);
    let generation = orchestrator.generate(&request("user: hello")).await;

    assert!(generation.mode.is_fallback());
    assert!(generation.text.contains("You asked: 'user: hello'"));
    assert!(ProvenanceArtifact::decode(&generation.proof).unwrap().is_fallback());

    let output = logs.contents();
    assert!(output.contains("exit_code=Some(1)"), "{output}");
    assert!(output.contains("ggml_init: out of memory"), "{output}");
}

#[tokio::test]
async fn absent_files_never_spawn() {
    let dir = TempDir::new().unwrap();
    let marker = dir.path().join("spawned");
    let script = write_script(
        dir.path(),
        "llama-cli",
        &format!("touch '{}'", marker.display()),
    );
    let config = InferenceConfig::new(
        dir.path().join("missing.gguf").to_string_lossy().into_owned(),
        script.to_string_lossy().into_owned(),
    );

    let orchestrator = InferenceOrchestrator::new(config);
    let generation = orchestrator.generate(&request("user: hello")).await;

    assert!(matches!(
        generation.mode,
        InferenceMode::FallenBack {
            cause: InferenceError::ModelMissing(_)
        }
    ));
    assert!(generation.text.contains("user: hello"));
    assert!(!marker.exists());
}
