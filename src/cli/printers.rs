// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/// Pretty printer for reporting information.
use std::borrow::Cow;

const VERTICAL_AND_RIGHT: char = '├';
const UP_AND_RIGHT: char = '└';

pub(crate) struct InfoPrinter {
    title: Cow<'static, str>,
    lines: Vec<Cow<'static, str>>,
}

impl InfoPrinter {
    pub(crate) fn new(title: Cow<'static, str>) -> Self {
        Self {
            title,
            lines: vec![],
        }
    }

    pub(crate) fn push_line(&mut self, line: Cow<'static, str>) {
        self.lines.push(line);
    }

    pub(crate) fn display(self) {
        log::info!("{}", console::style(self.title).bold());
        let num_lines = self.lines.len();
        for (i_line, line) in self.lines.into_iter().enumerate() {
            let symbol = if i_line + 1 == num_lines {
                UP_AND_RIGHT
            } else {
                VERTICAL_AND_RIGHT
            };
            log::info!("{symbol} {line}");
        }
        log::info!("");
    }
}
