// Copyright (c) 2026 rezky_nightky

use crossterm::style::Color;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Tile {
    pub ch: char,
    pub fg: Option<Color>,
    pub bg: Option<Color>,
    pub bold: bool,
}

impl Tile {
    pub fn blank(bg: Option<Color>) -> Self {
        Self {
            ch: ' ',
            fg: None,
            bg,
            bold: false,
        }
    }

    pub fn is_blank(&self) -> bool {
        self.ch == ' '
    }
}

#[derive(Clone, Debug)]
pub struct Frame {
    pub width: u16,
    pub height: u16,
    tiles: Vec<Tile>,
    blank: Tile,
}

impl Frame {
    pub fn new(width: u16, height: u16, bg: Option<Color>) -> Self {
        let blank = Tile::blank(bg);
        Self {
            width,
            height,
            tiles: vec![blank; width as usize * height as usize],
            blank,
        }
    }

    pub fn clear(&mut self) {
        self.tiles.fill(self.blank);
    }

    pub fn background(&self) -> Option<Color> {
        self.blank.bg
    }

    pub fn index(&self, x: u16, y: u16) -> Option<usize> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    pub fn get(&self, x: u16, y: u16) -> Option<&Tile> {
        self.index(x, y).map(|i| &self.tiles[i])
    }

    pub fn tile_at_index(&self, i: usize) -> Tile {
        self.tiles.get(i).copied().unwrap_or(self.blank)
    }

    pub fn set(&mut self, x: u16, y: u16, tile: Tile) {
        if let Some(i) = self.index(x, y) {
            self.tiles[i] = tile;
        }
    }

    pub fn put_str(&mut self, x: u16, y: u16, text: &str, fg: Option<Color>, bold: bool) {
        let bg = self.blank.bg;
        for (i, ch) in text.chars().enumerate() {
            let Some(cx) = x.checked_add(i as u16) else {
                break;
            };
            if cx >= self.width {
                break;
            }
            self.set(cx, y, Tile { ch, fg, bg, bold });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clear_makes_tiles_blank() {
        let mut f = Frame::new(2, 2, None);
        f.set(
            0,
            0,
            Tile {
                ch: 'x',
                fg: None,
                bg: None,
                bold: false,
            },
        );
        assert_eq!(f.get(0, 0).unwrap().ch, 'x');
        f.clear();
        assert!(f.get(0, 0).unwrap().is_blank());
    }

    #[test]
    fn out_of_range_writes_are_ignored() {
        let mut f = Frame::new(3, 1, Some(Color::Black));
        f.set(5, 0, Tile::blank(None));
        assert!(f.get(3, 0).is_none());
        f.put_str(1, 0, "abcdef", Some(Color::Green), false);
        assert_eq!(f.get(1, 0).unwrap().ch, 'a');
        assert_eq!(f.get(2, 0).unwrap().ch, 'b');
        assert_eq!(f.get(2, 0).unwrap().bg, Some(Color::Black));
    }
}
