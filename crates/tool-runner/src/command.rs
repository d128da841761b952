//! 명령 구성 — 도구별 argv 생성과 인자 주입 방어
//!
//! 명령은 항상 argv 배열로 구성되며 셸을 거치지 않습니다.
//! 사용자 입력(대상, 서비스명)은 [`validate_target`] /
//! [`validate_component`]를 통과해야 하며, 셸 메타문자나 선행 `-`가
//! 포함된 값은 세션 생성 전에 거부됩니다.

use pentora_core::config::ToolsConfig;
use pentora_core::error::ValidationError;
use pentora_core::types::{CommandSpec, ToolKind};

/// 대상/옵션 값에서 허용하지 않는 문자 집합
///
/// 셸 메타문자와 공백류 전부. argv로 전달하므로 셸 해석은 없지만,
/// 도구 자체가 값을 재해석하는 경로까지 함께 차단합니다.
const FORBIDDEN_CHARS: &[char] = &[
    ';', '&', '|', '`', '$', '(', ')', '{', '}', '<', '>', '"', '\'', '\\', '*', '?', '~', '!',
    '\n', '\r', '\t', ' ',
];

/// 스캔 대상 값을 검증합니다.
///
/// 호스트명, IP 또는 URL을 허용합니다. 비어 있거나, 금지 문자를
/// 포함하거나, `-`로 시작하면 거부합니다.
pub fn validate_target(field: &str, value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::EmptyField {
            field: field.to_owned(),
        });
    }
    if value.starts_with('-') {
        return Err(ValidationError::LeadingDash {
            field: field.to_owned(),
            value: value.to_owned(),
        });
    }
    if let Some(ch) = value.chars().find(|c| FORBIDDEN_CHARS.contains(c)) {
        return Err(ValidationError::ForbiddenCharacter {
            field: field.to_owned(),
            ch,
        });
    }
    Ok(())
}

/// 서비스명 등 단순 구성 요소를 검증합니다.
///
/// 영숫자, `-`, `_`만 허용합니다 (선행 `-` 제외).
pub fn validate_component(field: &str, value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::EmptyField {
            field: field.to_owned(),
        });
    }
    if value.starts_with('-') {
        return Err(ValidationError::LeadingDash {
            field: field.to_owned(),
            value: value.to_owned(),
        });
    }
    if let Some(ch) = value
        .chars()
        .find(|c| !c.is_ascii_alphanumeric() && *c != '-' && *c != '_')
    {
        return Err(ValidationError::ForbiddenCharacter {
            field: field.to_owned(),
            ch,
        });
    }
    Ok(())
}

/// 대상이 URL이 아니면 `http://` 접두어를 붙입니다.
///
/// 웹 계열 도구(nikto, sqlmap, gobuster)가 사용합니다.
fn ensure_url(target: &str) -> String {
    if target.starts_with("http://") || target.starts_with("https://") {
        target.to_owned()
    } else {
        format!("http://{target}")
    }
}

/// 도구별 명령을 구성합니다.
///
/// `service`는 hydra에서만 사용되며 무차별 대입 대상 프로토콜을
/// 지정합니다 (기본 `ssh`). 대상과 서비스는 호출 전에 검증을 마친
/// 상태여야 하지만, 방어적으로 여기서도 한 번 더 검증합니다.
pub fn build_command(
    tool: ToolKind,
    target: &str,
    service: &str,
    cfg: &ToolsConfig,
) -> Result<CommandSpec, ValidationError> {
    validate_target("target", target)?;

    let args = match tool {
        ToolKind::Nmap => vec![
            "-sV".to_owned(),
            "-O".to_owned(),
            "-oX".to_owned(),
            "-".to_owned(),
            target.to_owned(),
        ],
        ToolKind::Nikto => vec![
            "-h".to_owned(),
            target.to_owned(),
            "-Format".to_owned(),
            "txt".to_owned(),
        ],
        ToolKind::Hydra => {
            validate_component("service", service)?;
            vec![
                "-l".to_owned(),
                cfg.username.clone(),
                "-P".to_owned(),
                cfg.password_list.clone(),
                "-t".to_owned(),
                cfg.hydra_threads.to_string(),
                "-f".to_owned(),
                "-V".to_owned(),
                format!("{service}://{target}"),
            ]
        }
        ToolKind::Sqlmap => vec![
            "-u".to_owned(),
            ensure_url(target),
            "--forms".to_owned(),
            "--batch".to_owned(),
        ],
        ToolKind::Gobuster => vec![
            "dir".to_owned(),
            "-u".to_owned(),
            ensure_url(target),
            "-w".to_owned(),
            cfg.dir_wordlist.clone(),
            "-t".to_owned(),
            cfg.gobuster_threads.to_string(),
            "-q".to_owned(),
        ],
    };

    Ok(CommandSpec {
        tool,
        program: cfg.path(tool).to_owned(),
        args,
    })
}
