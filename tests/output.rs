use todo_tracker::error::Error;
use todo_tracker::output::{error_kind, format_human, HumanOutput};

#[test]
fn format_human_includes_every_part() {
    let mut human = HumanOutput::new("tt add: Buy milk");
    human.push_summary("id", "0f3a");
    human.push_detail("0. 0f3a Buy milk [low] General");
    human.push_warning("custom category");
    human.push_next_step("tt done 0f3a");

    let rendered = format_human(&human);
    let lines: Vec<&str> = rendered.lines().collect();
    assert_eq!(lines[0], "tt add: Buy milk");
    assert_eq!(lines[1], "  id  0f3a");
    assert_eq!(lines[2], "  0. 0f3a Buy milk [low] General");
    assert_eq!(lines[3], "warning: custom category");
    assert_eq!(lines[4], "next: tt done 0f3a");
}

#[test]
fn format_human_header_only() {
    let human = HumanOutput::new("tt draft clear");
    assert_eq!(format_human(&human), "tt draft clear");
}

#[test]
fn lock_timeouts_have_their_own_kind() {
    let err = Error::LockFailed("/tmp/todos.json.lock".into());
    assert_eq!(error_kind(&err), "locked");
}
