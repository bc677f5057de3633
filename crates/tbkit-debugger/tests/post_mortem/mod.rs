use indoc::{formatdoc, indoc};
use tbkit_debugger::{SessionExit, SessionState, rc};
use tbkit_report::frame::StackEntry;
use test_log::test;

use crate::common::{
    ScriptedTracer, command_outputs, listing, program, session, stack, transcript,
};

#[test]
fn navigation_is_clamped() {
    let (_dir, file) = program(28);
    let mut session = session(
        ScriptedTracer::default(),
        "up\nup\nup\ndown\ndown\ndown\nq\n",
    );

    let exit = session.post_mortem(stack(&file)).expect("post mortem");
    assert!(matches!(exit, SessionExit::Quit));
    assert_eq!(session.current_index(), 2);

    let transcript = transcript(&session);
    assert!(transcript.starts_with(&formatdoc! {"
        > {file} in leaf()
             17 line 17
        ---> 18 line 18
             19 line 19
    ", file = file.display()}));

    let outputs = command_outputs(&transcript);
    assert_eq!(
        outputs[0],
        formatdoc! {"
            > {file} in helper(x)
                 14 line 14
            ---> 15 line 15
                 16 line 16
        ", file = file.display()}
    );
    assert!(outputs[1].contains(" in main()\n"));
    assert_eq!(outputs[2], "*** Oldest frame\n");
    assert_eq!(outputs[5], "*** Newest frame\n");
}

#[test]
fn list_continues_where_it_left_off() {
    let (_dir, file) = program(28);
    let mut session = session(
        ScriptedTracer::default(),
        "list\n\nlist 3, 2\nlist 25\nlist x\nq\n",
    );

    session
        .post_mortem(vec![StackEntry::new(&file, 12, "main")])
        .expect("post mortem");

    let transcript = transcript(&session);
    let outputs = command_outputs(&transcript);

    assert_eq!(outputs[0], listing(7..=17, 12));
    assert_eq!(outputs[1], listing(18..=28, 12));
    assert_eq!(outputs[2], listing(3..=5, 12));
    assert_eq!(outputs[3], listing(20..=28, 12));
    assert_eq!(outputs[4], "*** Error in argument: 'x'\n");
}

#[test]
fn list_rejects_out_of_range_lines() {
    let (_dir, file) = program(28);
    let mut session = session(
        ScriptedTracer::default(),
        "list 18446744073709551615,1\nlist 99,2\nq\n",
    );

    let exit = session
        .post_mortem(vec![StackEntry::new(&file, 12, "main")])
        .expect("post mortem");
    assert!(matches!(exit, SessionExit::Quit));

    let transcript = transcript(&session);
    let outputs = command_outputs(&transcript);

    assert_eq!(
        outputs[0],
        "*** Error in argument: '18446744073709551615,1'\n"
    );
    assert_eq!(outputs[1], "");
}

#[test]
fn newest_breakpoint_wins_the_gutter() {
    let (_dir, file) = program(28);
    let mut session = session(
        ScriptedTracer::default(),
        "break 12\nbreak 12\ndisable 2\nlist 12\nbreak\nclear 1\nq\n",
    );

    session
        .post_mortem(vec![StackEntry::new(&file, 12, "main")])
        .expect("post mortem");

    let transcript = transcript(&session);
    let outputs = command_outputs(&transcript);
    let file = file.display();

    assert_eq!(outputs[0], format!("Breakpoint 1 at {file}:12\n"));
    assert_eq!(outputs[1], format!("Breakpoint 2 at {file}:12\n"));
    assert_eq!(outputs[2], format!("Disabled breakpoint 2 at {file}:12\n"));
    assert_eq!(
        outputs[3],
        listing(7..=17, 12).replace("---> 12", "2--> 12")
    );
    assert_eq!(
        outputs[4],
        formatdoc! {"
            Num Type         Disp Enb   Where
            1   breakpoint   keep yes at {file}:12
            2   breakpoint   keep no  at {file}:12
        "}
    );
    assert_eq!(outputs[5], format!("Deleted breakpoint 1 at {file}:12\n"));

    assert_eq!(session.tracer().cleared, [1]);
    assert!(session.breakpoints().get(1).is_none());
}

#[test]
fn breakpoint_past_end_of_file() {
    let (_dir, file) = program(28);
    let mut session = session(ScriptedTracer::default(), "break 40\nbreak zz\nq\n");

    session
        .post_mortem(vec![StackEntry::new(&file, 12, "main")])
        .expect("post mortem");

    let transcript = transcript(&session);
    let outputs = command_outputs(&transcript);

    assert_eq!(
        outputs[0],
        format!("*** End of file: {}:40\n", file.display())
    );
    assert_eq!(outputs[1], "*** Bad lineno: zz\n");
    assert!(session.breakpoints().is_empty());
}

#[test]
fn resuming_restarts_the_program() {
    let (_dir, file) = program(28);

    for command in ["c\n", "step\n", "next\n"] {
        let mut session = session(ScriptedTracer::default(), command);

        let exit = session.post_mortem(stack(&file)).expect("post mortem");
        assert!(matches!(exit, SessionExit::Restart), "{command}");
        assert_eq!(session.state(), SessionState::Terminated);
        assert!(session.tracer().resumes.is_empty());
    }
}

#[test]
fn end_of_input_quits() {
    let (_dir, file) = program(28);
    let mut session = session(ScriptedTracer::default(), "");

    let exit = session.post_mortem(stack(&file)).expect("post mortem");
    assert!(matches!(exit, SessionExit::Quit));
}

#[test]
fn empty_line_repeats_last_command() {
    let (_dir, file) = program(28);
    let mut session = session(ScriptedTracer::default(), "frobnicate 1\n\nq\n");

    session.post_mortem(stack(&file)).expect("post mortem");

    let transcript = transcript(&session);
    let outputs = command_outputs(&transcript);

    assert_eq!(outputs[0], "*** Unknown syntax: frobnicate 1\n");
    assert_eq!(outputs[1], "*** Unknown syntax: frobnicate 1\n");
}

#[test]
fn frame_values() {
    let (_dir, file) = program(28);
    let mut session = session(ScriptedTracer::default(), "up\np x\np y\na\nrv\nq\n");

    session.post_mortem(stack(&file)).expect("post mortem");

    let transcript = transcript(&session);
    let outputs = command_outputs(&transcript);

    assert_eq!(outputs[1], "3\n");
    assert_eq!(outputs[2], "*** name 'y' is not defined\n");
    assert_eq!(outputs[3], "x = 3\n");
    assert_eq!(outputs[4], "*** Not yet returned!\n");
}

#[test]
fn where_lists_frames_up_to_current() {
    let (_dir, file) = program(28);
    let mut session = session(ScriptedTracer::default(), "up\nwhere\nq\n");

    session.post_mortem(stack(&file)).expect("post mortem");

    let transcript = transcript(&session);
    let outputs = command_outputs(&transcript);
    let file = file.display();

    assert_eq!(
        outputs[1],
        formatdoc! {"
              {file} in main()
                 10 line 10
                 11 line 11
            ---> 12 line 12
                 13 line 13
                 14 line 14
            > {file} in helper(x)
                 13 line 13
                 14 line 14
            ---> 15 line 15
                 16 line 16
                 17 line 17
        "}
    );
}

#[test]
fn rc_lines_run_before_first_prompt() {
    let (_dir, file) = program(28);
    let rc_lines = rc::parse(indoc! {"
        # stop in the leaf
        tbreak 18
    "});

    let mut session = session(ScriptedTracer::default(), "q\n").with_rc_lines(rc_lines);
    session.post_mortem(stack(&file)).expect("post mortem");

    assert!(transcript(&session).starts_with(&formatdoc! {"
        Temporary breakpoint 1 at {file}:18
        > {file} in leaf()
             17 line 17
        1--> 18 line 18
             19 line 19
    ", file = file.display()}));
}

#[test]
fn help_on_commands() {
    let (_dir, file) = program(28);
    let mut session = session(ScriptedTracer::default(), "help list\nhelp nope\nh\nq\n");

    session.post_mortem(stack(&file)).expect("post mortem");

    let transcript = transcript(&session);
    let outputs = command_outputs(&transcript);

    assert!(outputs[0].starts_with("l(ist) [first [,last]]\n"));
    assert_eq!(outputs[1], "*** No help on nope\n");
    assert!(outputs[2].contains("Documented commands (type help <topic>):"));
    assert!(outputs[2].contains("retval"));

    assert_eq!(session.complete("di"), ["disable"]);
}
