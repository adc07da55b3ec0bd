use super::*;

mod test_helpers {
    use super::*;

    pub(super) fn parse_args(argv: &[&str]) -> Args {
        Args::try_parse_from(argv)
            .unwrap_or_else(|err| panic!("argv={argv:?} should parse successfully: {err}"))
    }
}

use test_helpers::parse_args;

#[test]
fn chat_is_the_default_command() {
    let args = parse_args(&["chitchat"]);
    assert!(args.command.is_none());
    assert!(!args.detailed);
    assert_eq!(args.provider, None);
}

#[test]
fn global_flags_work_before_and_after_subcommand() {
    let cases: [&[&str]; 2] = [
        &["chitchat", "-p", "groq", "--detailed", "chat"],
        &["chitchat", "chat", "--provider", "groq", "-d"],
    ];

    for argv in cases {
        let args = parse_args(argv);
        assert_eq!(args.command, Some(Commands::Chat), "argv={argv:?}");
        assert_eq!(args.provider.as_deref(), Some("groq"), "argv={argv:?}");
        assert!(args.detailed, "argv={argv:?}");
    }
}

#[test]
fn say_collects_the_whole_prompt() {
    let args = parse_args(&["chitchat", "say", "explain", "gravity"]);
    assert_eq!(
        args.command,
        Some(Commands::Say {
            prompt: vec!["explain".to_string(), "gravity".to_string()]
        })
    );
}

#[test]
fn auth_and_deauth_take_optional_provider() {
    assert_eq!(
        parse_args(&["chitchat", "auth"]).command,
        Some(Commands::Auth { provider: None })
    );
    assert_eq!(
        parse_args(&["chitchat", "deauth", "gemini"]).command,
        Some(Commands::Deauth {
            provider: Some("gemini".to_string())
        })
    );
}

#[test]
fn select_requires_provider() {
    assert!(Args::try_parse_from(["chitchat", "select"]).is_err());
    assert_eq!(
        parse_args(&["chitchat", "select", "together"]).command,
        Some(Commands::Select {
            provider: "together".to_string()
        })
    );
}

#[test]
fn clear_accepts_yes_flag() {
    assert_eq!(
        parse_args(&["chitchat", "clear", "--yes"]).command,
        Some(Commands::Clear { yes: true })
    );
    assert_eq!(
        parse_args(&["chitchat", "clear"]).command,
        Some(Commands::Clear { yes: false })
    );
}

#[test]
fn log_flag_feeds_overrides() {
    let args = parse_args(&["chitchat", "--log", "chat.log", "history"]);
    let overrides = args.overrides();
    assert_eq!(overrides.log_file.as_deref(), Some("chat.log"));
    assert_eq!(args.command, Some(Commands::History));
}

#[test]
fn set_takes_key_and_remaining_words() {
    assert_eq!(
        parse_args(&["chitchat", "set"]).command,
        Some(Commands::Set {
            key: None,
            value: vec![]
        })
    );
    assert_eq!(
        parse_args(&[
            "chitchat",
            "set",
            "endpoint",
            "groq",
            "http://localhost:8080/v1/chat/completions"
        ])
        .command,
        Some(Commands::Set {
            key: Some("endpoint".to_string()),
            value: vec![
                "groq".to_string(),
                "http://localhost:8080/v1/chat/completions".to_string()
            ]
        })
    );
}

#[test]
fn unset_takes_optional_provider() {
    assert_eq!(
        parse_args(&["chitchat", "unset", "endpoint", "gemini"]).command,
        Some(Commands::Unset {
            key: "endpoint".to_string(),
            value: Some("gemini".to_string())
        })
    );
    assert!(Args::try_parse_from(["chitchat", "unset"]).is_err());
}
