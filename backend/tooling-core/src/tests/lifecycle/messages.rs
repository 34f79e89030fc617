use crate::lifecycle::messages::MessageKey;

#[test]
fn given_template_with_two_placeholders_when_formatted_then_both_substituted() {
    let message = MessageKey::PortOccupiedOther.format(&["payara6", "4848", "Payara 5.2022.5"]);

    assert_eq!(
        message,
        "Admin port 4848 of server payara6 is used by another server (Payara 5.2022.5)"
    );
}

#[test]
fn given_missing_argument_when_formatted_then_placeholder_left() {
    let message = MessageKey::StartTimeout.format(&["payara6"]);

    assert_eq!(message, "Server payara6 did not start within {1} seconds");
}

#[test]
fn given_every_key_when_formatted_with_name_then_name_appears() {
    let keys = [
        MessageKey::StartRunning,
        MessageKey::AlreadyRunning,
        MessageKey::Launched,
        MessageKey::StopRunning,
        MessageKey::AlreadyStopped,
        MessageKey::RestartRunning,
        MessageKey::KillRunning,
        MessageKey::KillNoProcess,
        MessageKey::KillCompleted,
    ];

    for key in keys {
        let message = key.format(&["payara6"]);
        assert!(message.contains("payara6"), "{key:?}: {message}");
        assert!(!message.contains("{0}"), "{key:?}: {message}");
    }
}
