//! Commands shared by every front-end
//!
//! A front-end maps its input (menu item, key, CLI argument) to a
//! [`ViewCommand`] and hands it to [`ImageView::execute`]. Commands that
//! concern the document rather than the view go to a [`DocumentHost`].

use crate::types::{PixelSize, Result};
use crate::view::ImageView;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NavigateDirection {
    Previous,
    Next,
    First,
    Last,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ViewCommand {
    ZoomIn,
    ZoomOut,
    /// Back to original size
    ResetZoom,
    FitToWindow,
    RotateClockwise,
    RotateCounterclockwise,
    FlipHorizontal,
    FlipVertical,
    Navigate(NavigateDirection),
    Print,
    Delete,
}

impl ViewCommand {
    /// Whether the command only changes how the current image is shown
    pub fn is_transform(self) -> bool {
        !matches!(self, Self::Navigate(_) | Self::Print | Self::Delete)
    }
}

impl fmt::Display for ViewCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZoomIn => write!(f, "Zoom In"),
            Self::ZoomOut => write!(f, "Zoom Out"),
            Self::ResetZoom => write!(f, "Original Size"),
            Self::FitToWindow => write!(f, "Fit to Window"),
            Self::RotateClockwise => write!(f, "Rotate Clockwise"),
            Self::RotateCounterclockwise => write!(f, "Rotate Counterclockwise"),
            Self::FlipHorizontal => write!(f, "Flip Horizontal"),
            Self::FlipVertical => write!(f, "Flip Vertical"),
            Self::Navigate(NavigateDirection::Previous) => write!(f, "Previous"),
            Self::Navigate(NavigateDirection::Next) => write!(f, "Next"),
            Self::Navigate(NavigateDirection::First) => write!(f, "First"),
            Self::Navigate(NavigateDirection::Last) => write!(f, "Last"),
            Self::Print => write!(f, "Print"),
            Self::Delete => write!(f, "Delete"),
        }
    }
}

/// Owner of the image list behind a view
pub trait DocumentHost {
    /// Move to another image. `None` keeps the current one.
    fn navigate(&mut self, direction: NavigateDirection) -> Result<Option<PixelSize>>;

    /// Print what the view currently shows
    fn print(&mut self, view: &ImageView) -> Result<()>;

    /// Remove the current image; returns the image shown next, if any
    fn delete_current(&mut self) -> Result<Option<PixelSize>>;
}

impl ImageView {
    /// Run one command. Transform commands do nothing while no image is
    /// shown.
    pub fn execute(&mut self, command: ViewCommand, host: &mut dyn DocumentHost) -> Result<()> {
        if command.is_transform() && self.image_size().is_none() {
            log::debug!("ignoring '{}' without an image", command);
            return Ok(());
        }
        match command {
            ViewCommand::ZoomIn => self.transform_mut().zoom_in(),
            ViewCommand::ZoomOut => self.transform_mut().zoom_out(),
            ViewCommand::ResetZoom => self.transform_mut().reset_zoom(),
            ViewCommand::FitToWindow => return self.fit_to_window(),
            ViewCommand::RotateClockwise => self.transform_mut().rotate_clockwise(),
            ViewCommand::RotateCounterclockwise => self.transform_mut().rotate_counterclockwise(),
            ViewCommand::FlipHorizontal => self.transform_mut().flip_horizontal(),
            ViewCommand::FlipVertical => self.transform_mut().flip_vertical(),
            ViewCommand::Navigate(direction) => {
                if let Some(image) = host.navigate(direction)? {
                    self.set_image(Some(image))?;
                }
                return Ok(());
            }
            ViewCommand::Print => return host.print(self),
            ViewCommand::Delete => {
                let next = host.delete_current()?;
                return self.set_image(next);
            }
        }
        // A rotation changes the oriented size, so a fitted zoom follows it
        self.refit()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::{FitMode, ZoomLimits};
    use crate::types::Size;

    #[derive(Default)]
    struct Host {
        images: Vec<PixelSize>,
        current: usize,
        printed: usize,
    }

    impl DocumentHost for Host {
        fn navigate(&mut self, direction: NavigateDirection) -> Result<Option<PixelSize>> {
            let last = self.images.len().saturating_sub(1);
            let target = match direction {
                NavigateDirection::Previous => self.current.saturating_sub(1),
                NavigateDirection::Next => (self.current + 1).min(last),
                NavigateDirection::First => 0,
                NavigateDirection::Last => last,
            };
            if target == self.current {
                return Ok(None);
            }
            self.current = target;
            Ok(self.images.get(target).copied())
        }

        fn print(&mut self, _view: &ImageView) -> Result<()> {
            self.printed += 1;
            Ok(())
        }

        fn delete_current(&mut self) -> Result<Option<PixelSize>> {
            if self.current < self.images.len() {
                self.images.remove(self.current);
            }
            self.current = self.current.min(self.images.len().saturating_sub(1));
            Ok(self.images.get(self.current).copied())
        }
    }

    #[test]
    fn test_rotate_refits_in_fit_mode() {
        let mut host = Host::default();
        let mut view = ImageView::new(Size::new(800.0, 600.0), ZoomLimits::default());
        view.set_image(Some(PixelSize::new(1600, 900))).unwrap();
        view.execute(ViewCommand::FitToWindow, &mut host).unwrap();
        assert_eq!(view.transform().zoom(), 0.5);

        view.execute(ViewCommand::RotateClockwise, &mut host).unwrap();
        // 900 x 1600 into 800 x 600
        assert_eq!(view.transform().fit_mode(), FitMode::FitWindow);
        assert!((view.transform().zoom() - 0.375).abs() < 1e-12);
    }

    #[test]
    fn test_transform_commands_ignored_without_image() {
        let mut host = Host::default();
        let mut view = ImageView::new(Size::new(800.0, 600.0), ZoomLimits::default());
        let before = view.transform().revision();
        view.execute(ViewCommand::ZoomIn, &mut host).unwrap();
        assert_eq!(view.transform().revision(), before);
    }

    #[test]
    fn test_document_commands_go_to_host() {
        let mut host = Host {
            images: vec![PixelSize::new(10, 10), PixelSize::new(20, 10)],
            ..Default::default()
        };
        let mut view = ImageView::new(Size::new(100.0, 100.0), ZoomLimits::default());
        view.set_image(Some(host.images[0])).unwrap();

        view.execute(ViewCommand::Navigate(NavigateDirection::Next), &mut host)
            .unwrap();
        assert_eq!(view.image_size(), Some(PixelSize::new(20, 10)));

        view.execute(ViewCommand::Print, &mut host).unwrap();
        assert_eq!(host.printed, 1);

        view.execute(ViewCommand::Delete, &mut host).unwrap();
        view.execute(ViewCommand::Delete, &mut host).unwrap();
        assert_eq!(view.image_size(), None);
    }
}
