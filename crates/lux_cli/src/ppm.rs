//! Plain-text PPM output.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use lux_renderer::ImageBuffer;

/// Write an image as gamma-encoded P3.
pub fn write_ppm<W: Write>(writer: &mut W, image: &ImageBuffer) -> std::io::Result<()> {
    writeln!(writer, "P3\n{} {}\n255", image.width, image.height)?;
    for rgb in image.to_rgb8().chunks_exact(3) {
        writeln!(writer, "{} {} {}", rgb[0], rgb[1], rgb[2])?;
    }
    writer.flush()
}

pub fn save_ppm<P: AsRef<Path>>(path: P, image: &ImageBuffer) -> std::io::Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    write_ppm(&mut writer, image)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lux_renderer::Color;

    #[test]
    fn test_ppm_layout() {
        let mut image = ImageBuffer::new(2, 1);
        image.set(0, 0, Color::new(1.0, 0.25, 0.0));
        image.set(1, 0, Color::new(4.0, f32::NAN, -1.0));

        let mut out = Vec::new();
        write_ppm(&mut out, &image).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines, vec!["P3", "2 1", "255", "255 127 0", "255 0 0"]);
    }
}
