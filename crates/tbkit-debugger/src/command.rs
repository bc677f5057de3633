use indexmap::IndexMap;
use tbkit_tracer::ResumeMode;

/// Outcome of a command, driving the command loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flow {
    /// Keep reading commands.
    Stay,

    /// The program was resumed.
    Resume(ResumeMode),

    /// The program must be restarted.
    Restart,

    /// The session must end.
    Quit,
}

/// Commands understood by a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CommandKind {
    Help,
    Where,
    Up,
    Down,
    List,
    Break,
    TBreak,
    Clear,
    Enable,
    Disable,
    Condition,
    Ignore,
    Commands,
    Continue,
    Step,
    Next,
    Restart,
    Quit,
    Print,
    Args,
    Retval,
}

impl CommandKind {
    /// Returns whether running this command leaves the command loop (and
    /// thus ends a command list).
    pub fn is_resuming(self) -> bool {
        matches!(
            self,
            Self::Continue | Self::Step | Self::Next | Self::Restart | Self::Quit
        )
    }
}

/// Entry of the command table.
#[derive(Debug)]
pub struct CommandDef {
    /// Name of the command.
    pub name: &'static str,

    /// Shorter names of the command.
    pub aliases: &'static [&'static str],

    /// Usage and description of the command.
    pub help: &'static str,

    /// Handler of the command.
    pub kind: CommandKind,
}

static COMMANDS: &[CommandDef] = &[
    CommandDef {
        name: "help",
        aliases: &["h"],
        help: "h(elp) [command]\nWithout argument, print the list of available commands.\nWith a command name as argument, print help about that command.",
        kind: CommandKind::Help,
    },
    CommandDef {
        name: "where",
        aliases: &["w", "bt"],
        help: "w(here)\nPrint a stack trace, with the most recent frame at the bottom.\nAn arrow indicates the \"current frame\", which determines the\ncontext of most commands.",
        kind: CommandKind::Where,
    },
    CommandDef {
        name: "up",
        aliases: &["u"],
        help: "u(p)\nMove the current frame one level up in the stack trace\n(to an older frame).",
        kind: CommandKind::Up,
    },
    CommandDef {
        name: "down",
        aliases: &["d"],
        help: "d(own)\nMove the current frame one level down in the stack trace\n(to a newer frame).",
        kind: CommandKind::Down,
    },
    CommandDef {
        name: "list",
        aliases: &["l"],
        help: "l(ist) [first [,last]]\nList source code for the current file.\nWithout arguments, list 11 lines around the current line\nor continue the previous listing.\nWith one argument, list 11 lines starting at that line.\nWith two arguments, list the given range;\nif the second argument is less than the first, it is a count.",
        kind: CommandKind::List,
    },
    CommandDef {
        name: "break",
        aliases: &["b"],
        help: "b(reak) [([filename:]lineno) [, condition]]\nWith a line number argument, set a break there in the current file.\nWith a filename:lineno argument, set a break in that file.\nThe condition argument, if present, must evaluate to true\nfor the breakpoint to be honored.\nWithout argument, list all breaks.",
        kind: CommandKind::Break,
    },
    CommandDef {
        name: "tbreak",
        aliases: &[],
        help: "tbreak [([filename:]lineno) [, condition]]\nSame arguments as break, but the breakpoint is removed\nwhen first hit.",
        kind: CommandKind::TBreak,
    },
    CommandDef {
        name: "clear",
        aliases: &["cl"],
        help: "cl(ear) [bpnumber [bpnumber...]]\ncl(ear) filename:lineno\nWith a space separated list of breakpoint numbers, clear\nthose breakpoints. Without argument, clear all breaks.\nWith a filename:lineno argument, clear all breaks at that line.",
        kind: CommandKind::Clear,
    },
    CommandDef {
        name: "enable",
        aliases: &[],
        help: "enable bpnumber [bpnumber ...]\nEnables the breakpoints given as a space separated list of\nbreakpoint numbers.",
        kind: CommandKind::Enable,
    },
    CommandDef {
        name: "disable",
        aliases: &[],
        help: "disable bpnumber [bpnumber ...]\nDisables the breakpoints given as a space separated list of\nbreakpoint numbers. A disabled breakpoint never stops the\nprogram, but its hits are still counted.",
        kind: CommandKind::Disable,
    },
    CommandDef {
        name: "condition",
        aliases: &[],
        help: "condition bpnumber [condition]\nSet a new condition for the breakpoint. If condition is absent,\nany existing condition is removed.",
        kind: CommandKind::Condition,
    },
    CommandDef {
        name: "ignore",
        aliases: &[],
        help: "ignore bpnumber [count]\nSet the ignore count for the given breakpoint number. If count\nis omitted, the ignore count is set to 0.",
        kind: CommandKind::Ignore,
    },
    CommandDef {
        name: "commands",
        aliases: &[],
        help: "commands [bpnumber]\n(com) ...\n(com) end\nSpecify a list of commands for a breakpoint (by default, the\nlast one set). Type 'end' to terminate the list. A 'silent'\nline prevents the usual stack display when the breakpoint is\nhit. A command resuming the program ends the list.",
        kind: CommandKind::Commands,
    },
    CommandDef {
        name: "continue",
        aliases: &["c", "cont"],
        help: "c(ont(inue))\nContinue execution, only stop when a breakpoint is encountered.",
        kind: CommandKind::Continue,
    },
    CommandDef {
        name: "step",
        aliases: &["s"],
        help: "s(tep)\nExecute the current line, stop at the first possible occasion\n(either in a function that is called or in the current function).",
        kind: CommandKind::Step,
    },
    CommandDef {
        name: "next",
        aliases: &["n"],
        help: "n(ext)\nContinue execution until the next line in the current function\nis reached or it returns.",
        kind: CommandKind::Next,
    },
    CommandDef {
        name: "restart",
        aliases: &["run"],
        help: "restart\nRestart the debugged program. Breakpoints are kept.",
        kind: CommandKind::Restart,
    },
    CommandDef {
        name: "quit",
        aliases: &["q", "exit"],
        help: "q(uit) or exit\nQuit from the debugger. The program being executed is aborted.",
        kind: CommandKind::Quit,
    },
    CommandDef {
        name: "print",
        aliases: &["p"],
        help: "p(rint) name\nPrint the value of a (dotted) name in the current frame.",
        kind: CommandKind::Print,
    },
    CommandDef {
        name: "args",
        aliases: &["a"],
        help: "a(rgs)\nPrint the arguments of the current function.",
        kind: CommandKind::Args,
    },
    CommandDef {
        name: "retval",
        aliases: &["rv"],
        help: "retval\nPrint the return value of the last return of a function.",
        kind: CommandKind::Retval,
    },
];

/// Table mapping command names (and aliases) to their handler, built once
/// per session.
#[derive(Debug)]
pub struct CommandTable {
    by_name: IndexMap<&'static str, &'static CommandDef>,
}

impl CommandTable {
    /// Builds the table of the builtin commands.
    pub fn new() -> Self {
        let by_name = COMMANDS
            .iter()
            .flat_map(|def| {
                std::iter::once(def.name)
                    .chain(def.aliases.iter().copied())
                    .map(move |name| (name, def))
            })
            .collect();

        Self { by_name }
    }

    /// Returns the command with the given name or alias.
    pub fn lookup(&self, name: &str) -> Option<&'static CommandDef> {
        self.by_name.get(name).copied()
    }

    /// Returns the documented command names, in table order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> {
        COMMANDS.iter().map(|def| def.name)
    }

    /// Returns the command names (and aliases) starting with `prefix`,
    /// sorted.
    pub fn completions(&self, prefix: &str) -> Vec<&'static str> {
        let mut names: Vec<_> = self
            .by_name
            .keys()
            .copied()
            .filter(|name| name.starts_with(prefix))
            .collect();
        names.sort_unstable();
        names
    }
}

impl Default for CommandTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Splits a command line into the command name and its argument.
pub fn split_command(line: &str) -> (&str, &str) {
    let line = line.trim();

    match line.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (line, ""),
    }
}
