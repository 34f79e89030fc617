use crate::log_view::recognizer::{Recognizer, StackFrameRecognizer};

#[test]
fn given_java_stack_frame_when_parsed_then_source_location() {
    let location =
        StackFrameRecognizer::parse("\tat com.example.orders.OrderService.place(OrderService.java:42)")
            .unwrap();

    assert_eq!(location.class_name, "com.example.orders.OrderService");
    assert_eq!(location.method, "place");
    assert_eq!(location.file, "OrderService.java");
    assert_eq!(location.line, 42);
}

#[test]
fn given_module_qualified_constructor_frame_when_parsed_then_recognized() {
    let location = StackFrameRecognizer::parse(
        "    at java.base/java.lang.Thread.<init>(Thread.java:833)",
    )
    .unwrap();

    assert_eq!(location.class_name, "java.base/java.lang.Thread");
    assert_eq!(location.method, "<init>");
}

#[test]
fn given_frames_without_line_numbers_when_recognized_then_no_action() {
    let recognizer = StackFrameRecognizer;

    assert!(recognizer.recognize("\tat sun.reflect.Foo.bar(Unknown Source)").is_none());
    assert!(recognizer.recognize("INFO: at the end(of day)").is_none());
}

#[test]
fn given_frame_when_recognized_then_action_label_names_location() {
    let action = StackFrameRecognizer
        .recognize("at a.B.c(B.java:3)")
        .unwrap();

    assert_eq!(action.label(), "B.java:3 (a.B.c)");
}
