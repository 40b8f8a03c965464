//! Value parsers for the geometric command-line arguments.

use std::str::FromStr;

use imgbatch_core::{PreviewPoint, ViewportProvider};

/// `WxH` viewport size. Degenerate sizes are accepted and fall back later.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewportArg {
    width: u32,
    height: u32,
}

impl ViewportArg {
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

impl ViewportProvider for ViewportArg {
    fn viewport_size(&self) -> (u32, u32) {
        self.size()
    }
}

impl FromStr for ViewportArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        let (w, h) = lower
            .split_once('x')
            .ok_or_else(|| format!("expected WxH, got `{s}`"))?;
        let parse = |v: &str| {
            v.trim()
                .parse::<u32>()
                .map_err(|_| format!("`{}` is not a pixel size", v.trim()))
        };
        Ok(Self {
            width: parse(w)?,
            height: parse(h)?,
        })
    }
}

/// A drag gesture over the preview, `x1,y1,x2,y2` from press to release.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DragArg {
    pub start: PreviewPoint,
    pub end: PreviewPoint,
}

impl FromStr for DragArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let values = s
            .replace(',', " ")
            .split_whitespace()
            .map(|v| {
                v.parse::<i32>()
                    .map_err(|_| format!("`{v}` is not a pixel coordinate"))
            })
            .collect::<Result<Vec<_>, _>>()?;

        match values[..] {
            [x1, y1, x2, y2] => Ok(Self {
                start: PreviewPoint::new(x1, y1),
                end: PreviewPoint::new(x2, y2),
            }),
            _ => Err(format!("expected x1,y1,x2,y2, got {} values", values.len())),
        }
    }
}
