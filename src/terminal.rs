// Copyright (c) 2026 rezky_nightky

use std::io::{stdout, Result, Stdout, Write};

use crossterm::{
    cursor, event,
    style::{
        Attribute, Color, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor,
    },
    terminal, ExecutableCommand, QueueableCommand,
};

use crate::frame::{Frame, Tile};

struct LastFrame {
    width: u16,
    height: u16,
    tiles: Vec<Tile>,
}

struct Pen {
    fg: Option<Color>,
    bg: Option<Color>,
    bold: bool,
    pos: Option<(u16, u16)>,
}

pub struct Terminal {
    stdout: Stdout,
    last: Option<LastFrame>,
    run_buf: String,
}

impl Terminal {
    pub fn new() -> Result<Self> {
        let mut out = stdout();
        terminal::enable_raw_mode()?;
        let init_res: Result<()> = (|| {
            out.execute(terminal::EnterAlternateScreen)?;
            out.execute(cursor::Hide)?;
            let _ = out.execute(terminal::DisableLineWrap);
            out.execute(SetAttribute(Attribute::Reset))?;
            out.execute(ResetColor)?;
            out.execute(terminal::Clear(terminal::ClearType::All))?;
            out.flush()?;
            Ok(())
        })();
        if let Err(e) = init_res {
            restore_terminal_best_effort();
            return Err(e);
        }
        Ok(Self {
            stdout: out,
            last: None,
            run_buf: String::with_capacity(64),
        })
    }

    pub fn size(&self) -> Result<(u16, u16)> {
        terminal::size()
    }

    pub fn poll_event(timeout: std::time::Duration) -> Result<bool> {
        event::poll(timeout)
    }

    pub fn read_event() -> Result<event::Event> {
        event::read()
    }

    pub fn draw(&mut self, frame: &Frame) -> Result<()> {
        let resized = self
            .last
            .as_ref()
            .map(|l| l.width != frame.width || l.height != frame.height)
            .unwrap_or(true);
        if resized {
            self.stdout
                .queue(terminal::Clear(terminal::ClearType::All))?;
            self.last = None;
        }

        let mut pen = Pen {
            fg: None,
            bg: None,
            bold: false,
            pos: None,
        };
        self.stdout.queue(SetAttribute(Attribute::Reset))?;
        self.stdout.queue(ResetColor)?;

        let width = frame.width as usize;
        for y in 0..frame.height {
            let row = y as usize * width;
            let mut x = 0usize;
            while x < width {
                let idx = row + x;
                let tile = frame.tile_at_index(idx);
                if !self.changed(idx, tile) {
                    x += 1;
                    continue;
                }

                self.run_buf.clear();
                self.run_buf.push(tile.ch);
                let mut end = x + 1;
                while end < width {
                    let next = frame.tile_at_index(row + end);
                    if !self.changed(row + end, next)
                        || next.fg != tile.fg
                        || next.bg != tile.bg
                        || next.bold != tile.bold
                    {
                        break;
                    }
                    self.run_buf.push(next.ch);
                    end += 1;
                }

                self.paint_run(&mut pen, x as u16, y, tile, frame.width, (end - x) as u16)?;
                x = end;
            }
        }

        self.stdout.queue(SetAttribute(Attribute::Reset))?;
        self.stdout.queue(ResetColor)?;
        self.stdout.flush()?;

        self.last = Some(LastFrame {
            width: frame.width,
            height: frame.height,
            tiles: (0..width * frame.height as usize)
                .map(|i| frame.tile_at_index(i))
                .collect(),
        });
        Ok(())
    }

    fn changed(&self, idx: usize, tile: Tile) -> bool {
        match &self.last {
            Some(last) => last.tiles.get(idx).copied() != Some(tile),
            None => true,
        }
    }

    fn paint_run(
        &mut self,
        pen: &mut Pen,
        x: u16,
        y: u16,
        style: Tile,
        frame_width: u16,
        len: u16,
    ) -> Result<()> {
        if pen.pos != Some((x, y)) {
            self.stdout.queue(cursor::MoveTo(x, y))?;
        }
        if style.fg != pen.fg {
            self.stdout
                .queue(SetForegroundColor(style.fg.unwrap_or(Color::Reset)))?;
            pen.fg = style.fg;
        }
        if style.bg != pen.bg {
            self.stdout
                .queue(SetBackgroundColor(style.bg.unwrap_or(Color::Reset)))?;
            pen.bg = style.bg;
        }
        if style.bold != pen.bold {
            self.stdout.queue(SetAttribute(if style.bold {
                Attribute::Bold
            } else {
                Attribute::NormalIntensity
            }))?;
            pen.bold = style.bold;
        }
        self.stdout.queue(Print(self.run_buf.as_str()))?;
        let next_x = x.saturating_add(len);
        pen.pos = (next_x < frame_width).then_some((next_x, y));
        Ok(())
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        let _ = self.stdout.execute(SetAttribute(Attribute::Reset));
        let _ = self.stdout.execute(ResetColor);
        let _ = self.stdout.execute(cursor::Show);
        let _ = self.stdout.execute(terminal::EnableLineWrap);
        let _ = self.stdout.execute(terminal::LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
        let _ = self.stdout.flush();
    }
}

pub fn restore_terminal_best_effort() {
    let mut out = stdout();
    let _ = out.execute(SetAttribute(Attribute::Reset));
    let _ = out.execute(ResetColor);
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::EnableLineWrap);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();
    let _ = out.flush();
}
