//! Output style roles.
//!
//! Each logical role (Title, Label, etc.) is a variant of `StyleRole`, declared
//! through the `style!` table together with its colour and weight. The same
//! table styles the terminal output and the clap help text. Colouring only
//! happens when the `enabled` flag passed to `paint()` is true, so there is
//! no global colour state.
//!
//! ```
//! use barscan::core::styles::StyleRole;
//! let plain = StyleRole::Title.paint("Vaseline Lip Therapy", false);
//! assert_eq!(plain, "Vaseline Lip Therapy");
//! let colored = StyleRole::Title.paint("Vaseline Lip Therapy", true);
//! assert!(colored.starts_with("\x1b["));
//! assert!(colored.ends_with("\x1b[0m"));
//! ```

use clap::builder::styling::{AnsiColor, Color, Style};

macro_rules! style {
    ( $( $variant:ident => ($color:expr, $bold:expr) ),+ $(,)? ) => {
        #[derive(Copy, Clone, Debug, PartialEq, Eq)]
        pub enum StyleRole { $( $variant ),+ }

        impl StyleRole {
            pub fn color(self) -> Option<AnsiColor> {
                match self { $( StyleRole::$variant => $color ),+ }
            }

            pub fn is_bold(self) -> bool {
                match self { $( StyleRole::$variant => $bold ),+ }
            }
        }
    }
}

style! {
    Header   => (Some(AnsiColor::Yellow), true),
    Literal  => (Some(AnsiColor::Cyan), false),
    Title    => (Some(AnsiColor::BrightWhite), true),
    Label    => (Some(AnsiColor::BrightBlack), false),
    Value    => (None, false),
    Price    => (Some(AnsiColor::Green), false),
    Rating   => (Some(AnsiColor::Yellow), false),
    Pro      => (Some(AnsiColor::Green), false),
    Con      => (Some(AnsiColor::Red), false),
    NotFound => (Some(AnsiColor::Magenta), false),
    Error    => (Some(AnsiColor::BrightRed), true),
    Accent   => (Some(AnsiColor::Blue), false),
}

impl StyleRole {
    pub fn style(self) -> Style {
        let style = Style::new().fg_color(self.color().map(Color::Ansi));
        if self.is_bold() {
            style.bold()
        } else {
            style
        }
    }

    pub fn paint(self, text: &str, enabled: bool) -> String {
        let style = self.style();
        if !enabled || style == Style::new() {
            return text.to_string();
        }
        format!("{}{}{}", style.render(), text, style.render_reset())
    }
}

/// Build clap Styles for help output from the same roles
pub fn palette_to_clap(enabled: bool) -> clap::builder::Styles {
    if !enabled {
        return clap::builder::Styles::plain();
    }

    clap::builder::Styles::styled()
        .header(StyleRole::Header.style())
        .usage(StyleRole::Header.style())
        .literal(StyleRole::Literal.style())
        .placeholder(StyleRole::Price.style())
        .valid(StyleRole::Pro.style())
        .invalid(StyleRole::Con.style())
        .error(StyleRole::Error.style())
}
