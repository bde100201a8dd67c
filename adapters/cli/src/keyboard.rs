//! Reads player commands from standard input.

use std::{
    io::{self, BufRead},
    sync::mpsc::Sender,
    thread::{self, JoinHandle},
};

use tracing::{debug, warn};

use crate::session::Input;

/// Forwards recognised lines from stdin until it closes or the session hangs up.
pub(crate) fn spawn(inputs: Sender<Input>) -> JoinHandle<()> {
    thread::spawn(move || forward_lines(io::stdin().lock(), &inputs))
}

fn forward_lines(reader: impl BufRead, inputs: &Sender<Input>) {
    for line in reader.lines() {
        let line = match line {
            Ok(line) => line,
            Err(error) => {
                warn!(%error, "stopped reading player input");
                return;
            }
        };
        let Some(input) = Input::from_line(&line) else {
            debug!(line = %line, "ignored unrecognised input");
            continue;
        };
        if inputs.send(input).is_err() {
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;

    use super::*;

    #[test]
    fn forwards_recognised_lines_in_order() {
        let (sender, receiver) = mpsc::channel();
        forward_lines("m\nhello\n\nq\n".as_bytes(), &sender);
        drop(sender);

        let received: Vec<Input> = receiver.iter().collect();
        assert_eq!(received, vec![Input::Match, Input::Match, Input::Quit]);
    }
}
