use wmq_types::{
    constants::{
        MqLong, MQGMO_BROWSE_ANY, MQGMO_BROWSE_FIRST, MQGMO_BROWSE_MSG_UNDER_CURSOR,
        MQGMO_BROWSE_NEXT, MQGMO_MSG_UNDER_CURSOR, MQOO_BROWSE, MQOO_INPUT_ANY,
    },
    options::GetOptions,
    Message,
};

use crate::{error::Error, mqi::Mqi};

use super::Queue;

/// Position of the browse cursor of a queue handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cursor {
    /// No browse has been issued since the queue was opened
    #[default]
    Unpositioned,
    /// Positioned by a browse-first request
    First,
    /// Moved by at least one browse-next request
    Next,
}

impl Cursor {
    /// Rejects get options that are out of order for the current position
    pub(crate) fn check(&self, open_options: MqLong, get_options: MqLong) -> Result<(), Error> {
        if get_options & MQGMO_BROWSE_FIRST != 0 && get_options & MQGMO_BROWSE_NEXT != 0 {
            return Err(Error::InvalidSequence(
                "browse first and browse next cannot be combined",
            ));
        }

        let needs_position =
            MQGMO_BROWSE_NEXT | MQGMO_BROWSE_MSG_UNDER_CURSOR | MQGMO_MSG_UNDER_CURSOR;
        if get_options & needs_position != 0
            && get_options & MQGMO_BROWSE_FIRST == 0
            && *self == Cursor::Unpositioned
        {
            return Err(Error::InvalidSequence(
                "browse first must be issued before browsing from the cursor",
            ));
        }

        let browse_only = open_options & MQOO_BROWSE != 0 && open_options & MQOO_INPUT_ANY == 0;
        if browse_only && get_options & (MQGMO_BROWSE_ANY | MQGMO_MSG_UNDER_CURSOR) == 0 {
            return Err(Error::InvalidSequence(
                "a browse handle needs browse first before any get",
            ));
        }
        Ok(())
    }

    /// Moves the cursor after a get that found a message, or after a browse
    /// first that found none
    pub(crate) fn advance(&mut self, get_options: MqLong, found: bool) {
        if get_options & MQGMO_BROWSE_FIRST != 0 {
            *self = Cursor::First;
        } else if found && get_options & MQGMO_BROWSE_NEXT != 0 {
            *self = Cursor::Next;
        }
    }
}

/// Iterator over the messages of a queue, see [`Queue::messages`]
#[derive(Debug)]
pub struct Messages<'q, 'c, M: Mqi> {
    queue: &'q mut Queue<'c, M>,
    options: GetOptions,
    browse: bool,
    started: bool,
    done: bool,
}

impl<'q, 'c, M: Mqi> Messages<'q, 'c, M> {
    pub(crate) fn new(queue: &'q mut Queue<'c, M>, options: GetOptions) -> Self {
        let open_options = queue.open_options();
        let browse = options.is_browse()
            || (open_options & MQOO_BROWSE != 0 && open_options & MQOO_INPUT_ANY == 0);
        Self {
            queue,
            options,
            browse,
            started: false,
            done: false,
        }
    }
}

impl<'q, 'c, M: Mqi> Iterator for Messages<'q, 'c, M> {
    type Item = Result<Message, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let mut options = self.options.clone();
        if self.browse {
            options.options &= !MQGMO_BROWSE_ANY;
            options.options |= if self.started {
                MQGMO_BROWSE_NEXT
            } else {
                MQGMO_BROWSE_FIRST
            };
        }

        let mut message = Message::new();
        match self.queue.get(&mut message, &options) {
            Ok(true) => {
                self.started = true;
                Some(Ok(message))
            }
            Ok(false) => {
                self.done = true;
                None
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}
