use image::{GrayImage, Luma};

/// Binary structuring element anchored at its centre.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructuringElement {
    width: u32,
    height: u32,
    cells: Vec<bool>,
}

impl StructuringElement {
    /// Ellipse inscribed in a `width` x `height` box.
    ///
    /// Row `i` covers the columns within `c * sqrt(1 - dy^2 / r^2)` of the
    /// centre column, with `r = height / 2`, `c = width / 2` and `dy = i - r`.
    pub fn ellipse(width: u32, height: u32) -> Self {
        let (w, h) = (width.max(1) as i32, height.max(1) as i32);
        let r = h / 2;
        let c = w / 2;
        let inv_r2 = if r > 0 { 1.0 / (r * r) as f64 } else { 0.0 };
        let mut cells = vec![false; (w * h) as usize];

        for i in 0..h {
            let dy = i - r;
            let (j1, j2) = if dy.abs() <= r {
                let dx = (c as f64 * (((r * r - dy * dy) as f64) * inv_r2).sqrt()).round() as i32;
                ((c - dx).max(0), (c + dx + 1).min(w))
            } else {
                (0, 0)
            };
            for j in j1..j2 {
                cells[(i * w + j) as usize] = true;
            }
        }

        Self {
            width: w as u32,
            height: h as u32,
            cells,
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn contains(&self, x: u32, y: u32) -> bool {
        x < self.width && y < self.height && self.cells[(y * self.width + x) as usize]
    }

    /// Offsets of the active cells relative to the anchor.
    fn offsets(&self) -> Vec<(i32, i32)> {
        let (ax, ay) = ((self.width / 2) as i32, (self.height / 2) as i32);
        (0..self.height)
            .flat_map(|y| (0..self.width).map(move |x| (x, y)))
            .filter(|&(x, y)| self.contains(x, y))
            .map(|(x, y)| (x as i32 - ax, y as i32 - ay))
            .collect()
    }
}

/// Shared sweep for dilation and erosion; out-of-bounds neighbours are skipped.
fn sweep(mask: &GrayImage, element: &StructuringElement, dilate: bool) -> GrayImage {
    let (width, height) = mask.dimensions();
    let offsets = element.offsets();
    let is_set = |x: i32, y: i32| -> Option<bool> {
        if x < 0 || y < 0 || x >= width as i32 || y >= height as i32 {
            None
        } else {
            Some(mask.get_pixel(x as u32, y as u32).0[0] != 0)
        }
    };

    GrayImage::from_fn(width, height, |x, y| {
        let mut neighbours = offsets
            .iter()
            .filter_map(|&(dx, dy)| is_set(x as i32 + dx, y as i32 + dy));
        let on = if dilate {
            neighbours.any(|set| set)
        } else {
            neighbours.all(|set| set)
        };
        Luma([if on { 255 } else { 0 }])
    })
}

pub fn dilate(mask: &GrayImage, element: &StructuringElement) -> GrayImage {
    sweep(mask, element, true)
}

pub fn erode(mask: &GrayImage, element: &StructuringElement) -> GrayImage {
    sweep(mask, element, false)
}

/// Dilation followed by erosion: fills gaps narrower than the element.
pub fn close(mask: &GrayImage, element: &StructuringElement) -> GrayImage {
    erode(&dilate(mask, element), element)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(element: &StructuringElement) -> Vec<String> {
        let (w, h) = element.dimensions();
        (0..h)
            .map(|y| {
                (0..w)
                    .map(|x| if element.contains(x, y) { '1' } else { '0' })
                    .collect()
            })
            .collect()
    }

    #[test]
    fn test_ellipse_5x5() {
        let element = StructuringElement::ellipse(5, 5);
        assert_eq!(
            render(&element),
            vec!["00100", "11111", "11111", "11111", "00100"]
        );
    }

    #[test]
    fn test_ellipse_11x11_is_symmetric() {
        let element = StructuringElement::ellipse(11, 11);
        let rows = render(&element);
        assert_eq!(rows[0], "00000100000");
        assert_eq!(rows[5], "11111111111");
        for i in 0..11 {
            assert_eq!(rows[i], rows[10 - i]);
            let reversed: String = rows[i].chars().rev().collect();
            assert_eq!(rows[i], reversed);
        }
    }

    #[test]
    fn test_close_fills_small_gap() {
        let mut mask = GrayImage::new(30, 30);
        for y in 10..20 {
            for x in 5..25 {
                if x != 15 {
                    mask.put_pixel(x, y, Luma([255]));
                }
            }
        }
        let closed = close(&mask, &StructuringElement::ellipse(5, 5));
        // The notch where the gap meets the top and bottom edges survives
        for y in 11..19 {
            assert_eq!(closed.get_pixel(15, y).0[0], 255, "gap at row {y}");
        }
        // Closing does not grow the outer extent
        assert_eq!(closed.get_pixel(4, 15).0[0], 0);
        assert_eq!(closed.get_pixel(25, 15).0[0], 0);
    }

    #[test]
    fn test_close_keeps_region_touching_border() {
        let mut mask = GrayImage::new(20, 20);
        for y in 0..20 {
            for x in 0..8 {
                mask.put_pixel(x, y, Luma([255]));
            }
        }
        let closed = close(&mask, &StructuringElement::ellipse(5, 5));
        assert_eq!(closed, mask);
    }
}
