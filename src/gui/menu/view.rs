use super::model::{MenuButton, Session};
use crate::gui::theme::ThemeColors;
use cairo::Context;
use gdk4::prelude::*;
use gdk_pixbuf::Pixbuf;
use palette::Srgba;
use std::f64::consts::PI;

struct ButtonRenderer<'a> {
    button: &'a MenuButton,
    hovered: bool,
}

impl<'a> ButtonRenderer<'a> {
    fn new(button: &'a MenuButton, hovered: bool) -> Self {
        Self { button, hovered }
    }

    fn draw(&self, cr: &Context, colors: &ThemeColors) -> Result<(), cairo::Error> {
        self.draw_circle(cr, colors)?;
        if let Some(pixbuf) = &self.button.pixbuf {
            self.draw_icon(cr, pixbuf)?;
        }
        Ok(())
    }

    fn draw_circle(&self, cr: &Context, colors: &ThemeColors) -> Result<(), cairo::Error> {
        let color = self.color(colors);
        let (r, g, b, a) = color.into_components();
        cr.set_source_rgba(r, g, b, a * self.button.opacity());

        let rect = self.button.rect();
        let center = rect.center();
        cr.arc(center.x, center.y, rect.width / 2.0, 0.0, 2.0 * PI);
        cr.fill()
    }

    fn draw_icon(&self, cr: &Context, pixbuf: &Pixbuf) -> Result<(), cairo::Error> {
        let rect = self.button.rect();
        let center = rect.center();
        let (iw, ih) = (pixbuf.width() as f64, pixbuf.height() as f64);
        let (ix, iy) = (center.x - iw / 2.0, center.y - ih / 2.0);

        // Paint through a group so the fade applies to the icon as a whole.
        cr.save()?;
        cr.push_group();
        cr.set_source_pixbuf(pixbuf, ix, iy);
        cr.paint()?;
        cr.pop_group_to_source()?;
        cr.paint_with_alpha(self.button.opacity())?;
        cr.restore()
    }

    fn color(&self, colors: &ThemeColors) -> Srgba<f64> {
        if self.hovered {
            colors.hovered
        } else {
            colors.base
        }
    }
}

pub fn draw(cr: &Context, session: &Session, colors: &ThemeColors) -> Result<(), cairo::Error> {
    for (i, button) in session.buttons().iter().enumerate() {
        ButtonRenderer::new(button, session.hover() == Some(i)).draw(cr, colors)?;
    }
    Ok(())
}
