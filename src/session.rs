use crate::model::SourceImage;

/// Crop dimensions the user asked for, kept for the lifetime of the app.
///
/// Both slots are filled lazily from the first image seen and afterwards only
/// change through [`Session::confirm`].
#[derive(Debug, Default)]
pub struct Session {
    desired_width: Option<u32>,
    desired_height: Option<u32>,
}

/// Returned by [`Session::confirm`]. The host has to redraw the crop widget
/// from scratch before anything reads the session again.
#[must_use = "the crop widget keeps its old box unless the refresh is applied"]
#[derive(Debug, PartialEq, Eq)]
pub struct Refresh;

fn half(dimension: u32) -> u32 {
    (dimension / 2).max(1)
}

impl Session {
    pub fn get_or_init(&mut self, image: &SourceImage) -> (u32, u32) {
        let width = *self
            .desired_width
            .get_or_insert_with(|| half(image.width()));
        let height = *self
            .desired_height
            .get_or_insert_with(|| half(image.height()));
        (width, height)
    }

    /// Stored dimensions, or the defaults `image` would produce, without
    /// storing anything.
    pub fn dimensions_for(&self, image: &SourceImage) -> (u32, u32) {
        (
            self.desired_width.unwrap_or_else(|| half(image.width())),
            self.desired_height.unwrap_or_else(|| half(image.height())),
        )
    }

    #[cfg(test)]
    pub fn desired(&self) -> Option<(u32, u32)> {
        self.desired_width.zip(self.desired_height)
    }

    pub fn confirm(&mut self, width: u32, height: u32) -> Refresh {
        log::info!("Crop dimensions confirmed: {width}x{height}");
        self.desired_width = Some(width);
        self.desired_height = Some(height);
        Refresh
    }

    /// Pulls stored dimensions back inside a newly loaded image.
    pub fn fit_to(&mut self, image: &SourceImage) {
        if let Some(width) = &mut self.desired_width {
            *width = (*width).clamp(1, image.width().max(1));
        }
        if let Some(height) = &mut self.desired_height {
            *height = (*height).clamp(1, image.height().max(1));
        }
    }
}
