use crate::config::NotifyConfig;

// lower-cased fragments of user agents sent by SDKs, CLIs and plain HTTP clients
const SDK_USER_AGENT_MARKERS: &[&str] = &[
    "aws-sdk",
    "botocore",
    "boto3",
    "aws-cli",
    "curl",
    "wget",
    "go-http-client",
    "python-urllib",
];

const NON_HUMAN_IDENTITY_TYPES: &[&str] = &["AWSService", "AssumedRole"];

const INFRASTRUCTURE_ROLES: &[&str] = &[
    "ecsTaskExecutionRole",
    "AWSServiceRoleForECS",
    "AWSServiceRoleForEC2",
];

const ASSUMED_ROLE_MARKER: &str = "assumed-role/";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Caller {
    Human,
    Automated,
}

/// The identity fields the classifier looks at.
#[derive(Debug, Clone, Copy, Default)]
pub struct Principal<'a> {
    pub identity_type: Option<&'a str>,
    pub arn: Option<&'a str>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub caller: Caller,
    /// Name of the rule that fired, `None` when no rule matched.
    pub rule: Option<&'static str>,
}

impl Classification {
    pub fn is_automated(&self) -> bool {
        self.caller == Caller::Automated
    }
}

struct Rule {
    name: &'static str,
    matches: fn(&Principal, &str, &NotifyConfig) -> bool,
}

// evaluated top to bottom, first match wins
const RULES: &[Rule] = &[
    Rule {
        name: "sdk-user-agent",
        matches: sdk_user_agent,
    },
    Rule {
        name: "service-principal",
        matches: service_principal,
    },
    Rule {
        name: "infrastructure-role",
        matches: infrastructure_role,
    },
];

fn sdk_user_agent(_: &Principal, user_agent: &str, config: &NotifyConfig) -> bool {
    if config.treat_cli_as_human {
        return false;
    }
    let user_agent = user_agent.to_lowercase();
    SDK_USER_AGENT_MARKERS
        .iter()
        .any(|marker| user_agent.contains(marker))
}

fn service_principal(principal: &Principal, _: &str, _: &NotifyConfig) -> bool {
    principal
        .identity_type
        .is_some_and(|t| NON_HUMAN_IDENTITY_TYPES.contains(&t))
}

fn infrastructure_role(principal: &Principal, _: &str, _: &NotifyConfig) -> bool {
    principal
        .arn
        .and_then(assumed_role_name)
        .is_some_and(|role| INFRASTRUCTURE_ROLES.contains(&role))
}

/// Role name from an STS assumed-role ARN,
/// e.g. `arn:aws:sts::123456789012:assumed-role/ecsTaskExecutionRole/abc` -> `ecsTaskExecutionRole`.
pub fn assumed_role_name(arn: &str) -> Option<&str> {
    let (_, rest) = arn.split_once(ASSUMED_ROLE_MARKER)?;
    rest.split('/').next().filter(|role| !role.is_empty())
}

/// Best-effort guess at whether a request came from a person or from
/// automation. This is a triage hint, not a security control.
pub fn classify(principal: &Principal, user_agent: &str, config: &NotifyConfig) -> Classification {
    let rule = RULES
        .iter()
        .find(|rule| (rule.matches)(principal, user_agent, config));

    match rule {
        Some(rule) => Classification {
            caller: Caller::Automated,
            rule: Some(rule.name),
        },
        None => Classification {
            caller: Caller::Human,
            rule: None,
        },
    }
}
