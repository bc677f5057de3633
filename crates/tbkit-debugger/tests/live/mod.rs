use tbkit_debugger::{CommandList, SessionExit, Supervisor};
use tbkit_report::frame::StackEntry;
use tbkit_report::render::CapturedException;
use tbkit_report::value::Value;
use tbkit_tracer::{DebugEvent, ResumeMode};
use test_log::test;

use crate::common::{ScriptedTracer, command_outputs, program, session, stack, transcript};

fn step_at_main(file: &std::path::Path) -> DebugEvent {
    DebugEvent::Step {
        stack: vec![StackEntry::new(file, 12, "main")],
    }
}

#[test]
fn command_list_runs_on_hit() {
    let (_dir, file) = program(28);
    let tracer = ScriptedTracer::new([
        step_at_main(&file),
        DebugEvent::Breakpoint {
            number: 1,
            stack: stack(&file)[..2].to_vec(),
        },
        DebugEvent::Exited { exit_code: 0 },
    ]);

    let mut session = session(
        tracer,
        "break 15\ncommands\nsilent\np total\ncontinue\nc\n",
    );

    let exit = session.run().expect("run");
    assert!(matches!(exit, SessionExit::Completed { exit_code: 0 }));

    let transcript = transcript(&session);
    assert_eq!(transcript.matches("(com) ").count(), 3);
    assert!(transcript.ends_with("ipdb> (com) (com) (com) ipdb> 42\n"));
    assert!(!transcript.contains(" in helper("));

    assert_eq!(
        session.command_list(1),
        Some(&CommandList {
            commands: vec!["p total".to_owned(), "continue".to_owned()],
            silent: true,
        })
    );
    assert_eq!(
        session.tracer().resumes,
        [ResumeMode::Continue, ResumeMode::Continue]
    );
}

#[test]
fn ignore_counts_and_temporary_breakpoints() {
    let (_dir, file) = program(28);
    let tracer = ScriptedTracer::new([
        step_at_main(&file),
        DebugEvent::Breakpoint {
            number: 1,
            stack: stack(&file)[..2].to_vec(),
        },
        DebugEvent::Breakpoint {
            number: 1,
            stack: stack(&file)[..2].to_vec(),
        },
        DebugEvent::Breakpoint {
            number: 2,
            stack: stack(&file),
        },
        DebugEvent::Exited { exit_code: 3 },
    ]);

    let mut session = session(tracer, "break 15\nignore 1 1\ntbreak 18\nc\nc\nc\n");

    let exit = session.run().expect("run");
    assert!(matches!(exit, SessionExit::Completed { exit_code: 3 }));

    let transcript = transcript(&session);
    let file = file.display();
    assert!(transcript.contains("Will ignore next crossing of breakpoint 1.\n"));
    assert!(transcript.contains(&format!("Temporary breakpoint 2 at {file}:18\n")));
    assert!(transcript.contains(&format!("Deleted breakpoint 2 at {file}:18\n")));

    // stopped once in helper (second hit), once in leaf
    assert_eq!(transcript.matches(&format!("> {file} in helper(x)\n")).count(), 1);
    assert_eq!(transcript.matches(&format!("> {file} in leaf()\n")).count(), 1);

    assert_eq!(session.tracer().resumes.len(), 4);
    assert_eq!(session.tracer().cleared, [2]);
    assert_eq!(session.breakpoints().get(1).map(|bp| bp.hits), Some(2));
    assert!(session.breakpoints().get(2).is_none());
}

#[test]
fn tracer_failures_are_shown() {
    let (_dir, file) = program(28);
    let tracer = ScriptedTracer::new([step_at_main(&file)]).broken();

    let mut session = session(tracer, "next\nq\n");

    let exit = session.run().expect("run");
    assert!(matches!(exit, SessionExit::Quit));

    let transcript = transcript(&session);
    assert_eq!(command_outputs(&transcript)[0], "*** target is gone\n");
}

#[test]
fn failed_resume_past_skipped_breakpoint_stops_there() {
    let (_dir, file) = program(28);
    let tracer = ScriptedTracer::new([
        step_at_main(&file),
        DebugEvent::Breakpoint {
            number: 1,
            stack: stack(&file)[..2].to_vec(),
        },
        DebugEvent::Exited { exit_code: 0 },
    ])
    .broken_after(1);

    let mut session = session(tracer, "break 15\ndisable 1\nc\nq\n");

    let exit = session.run().expect("run");
    assert!(matches!(exit, SessionExit::Quit));

    let transcript = transcript(&session);
    let outputs = command_outputs(&transcript);

    assert!(outputs[2].starts_with("*** target is gone\n> "), "{}", outputs[2]);
    assert!(outputs[2].contains(" in helper(x)\n"));
    assert_eq!(session.breakpoints().get(1).map(|bp| bp.hits), Some(1));
}

#[test]
fn lost_program_ends_session() {
    let (_dir, file) = program(28);
    let tracer = ScriptedTracer::new([step_at_main(&file)]);

    let mut session = session(tracer, "c\n");

    let exit = session.run().expect("run");
    assert!(matches!(
        exit,
        SessionExit::Detached { ref reason } if reason == "No program is being traced"
    ));
    assert!(transcript(&session).ends_with("ipdb> *** No program is being traced\n"));

    let tracer = ScriptedTracer::new([step_at_main(&file)]);
    let mut supervisor = Supervisor::new(self::session(tracer, "c\n"));
    supervisor.run().expect("supervise");

    assert!(
        transcript(supervisor.session()).ends_with("The program can't be traced anymore\n")
    );
    assert_eq!(supervisor.session().tracer().restarts, 0);
}

#[test]
fn supervisor_restarts_after_frameless_failure() {
    let (_dir, file) = program(28);
    let tracer = ScriptedTracer::new([DebugEvent::Exception {
        exception: CapturedException::new("ZeroDivisionError", Value::new("division by zero")),
        stack: Vec::new(),
    }])
    .then_run([step_at_main(&file)]);

    let mut supervisor = Supervisor::new(session(tracer, "q\n"));
    supervisor.run().expect("supervise");

    let transcript = transcript(supervisor.session());
    assert!(transcript.contains("ZeroDivisionError: division by zero\n"));
    assert!(transcript.contains(concat!(
        "*** No stack to inspect\n",
        "Post mortem debugger finished. The program will be restarted\n",
        "> ",
    )));
    assert_eq!(supervisor.session().tracer().restarts, 1);
}

#[test]
fn supervisor_enters_post_mortem() {
    let (_dir, file) = program(28);
    let tracer = ScriptedTracer::new([DebugEvent::Exception {
        exception: CapturedException::new("ZeroDivisionError", Value::new("division by zero")),
        stack: stack(&file),
    }])
    .then_run([step_at_main(&file)]);

    let mut supervisor = Supervisor::new(session(tracer, "c\nq\n"));
    supervisor.run().expect("supervise");

    let session = supervisor.session();
    let transcript = transcript(session);

    let report = transcript
        .find("ZeroDivisionError: division by zero\n")
        .expect("report");
    let entering = transcript
        .find(concat!(
            "Uncaught exception. Entering post mortem debugging\n",
            "Running 'cont' or 'step' will restart the program\n",
            "> ",
        ))
        .expect("post mortem");
    let finished = transcript
        .find("Post mortem debugger finished. The program will be restarted\n> ")
        .expect("restart");

    assert!(report < entering && entering < finished);
    assert!(transcript[finished..].contains(" in main()\n"));
    assert_eq!(session.tracer().restarts, 1);
}

#[test]
fn supervisor_restarts_completed_program() {
    let (_dir, file) = program(28);
    let tracer = ScriptedTracer::new([DebugEvent::Exited { exit_code: 0 }])
        .then_run([DebugEvent::Exited { exit_code: 2 }])
        .then_run([step_at_main(&file)]);

    let mut supervisor = Supervisor::new(session(tracer, "q\n"));
    supervisor.run().expect("supervise");

    let transcript = transcript(supervisor.session());
    assert!(transcript.starts_with(concat!(
        "The program finished and will be restarted\n",
        "The program exited. Exit status: 2\n",
        "> ",
    )));
    assert_eq!(supervisor.session().tracer().restarts, 2);
}
