//! Named user actions.
//!
//! A [`CommandRegistry`] maps command names to handler closures over the
//! application state. Front-ends turn toolbar presses, pointer events and key
//! presses into command lines and dispatch them here.

use std::{collections::BTreeMap, fmt::Write as _, path::Path};

use tracing::{debug, instrument};

use crate::{Error, Result, TextPick, ViewportPoint};

pub type Handler = Box<dyn Fn(&mut TextPick, &[&str]) -> Result<String>>;

struct Entry {
    usage: &'static str,
    verbatim: bool,
    handler: Handler,
}

#[derive(Default)]
pub struct CommandRegistry {
    commands: BTreeMap<String, Entry>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &mut self,
        name: &str,
        usage: &'static str,
        handler: impl Fn(&mut TextPick, &[&str]) -> Result<String> + 'static,
    ) -> &mut Self {
        self.insert(name, usage, false, Box::new(handler))
    }

    /// Registers a command whose handler gets everything after the command
    /// name as a single argument, untouched. Used for paths and free text.
    pub fn register_verbatim(
        &mut self,
        name: &str,
        usage: &'static str,
        handler: impl Fn(&mut TextPick, &str) -> Result<String> + 'static,
    ) -> &mut Self {
        let handler = move |app: &mut TextPick, args: &[&str]| {
            handler(app, args.first().copied().unwrap_or_default())
        };
        self.insert(name, usage, true, Box::new(handler))
    }

    fn insert(
        &mut self,
        name: &str,
        usage: &'static str,
        verbatim: bool,
        handler: Handler,
    ) -> &mut Self {
        self.commands.insert(
            name.to_owned(),
            Entry {
                usage,
                verbatim,
                handler,
            },
        );
        self
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.commands.keys().map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.commands.contains_key(name)
    }

    pub fn help(&self) -> String {
        let mut out = String::from("  help          list commands\n");
        for (name, entry) in &self.commands {
            let _ = writeln!(out, "  {name:<14}{}", entry.usage);
        }
        out
    }

    /// Runs one command line. Blank lines and `#` comments yield `None`.
    #[instrument(level = "debug", skip(self, app))]
    pub fn dispatch(&self, app: &mut TextPick, line: &str) -> Result<Option<String>> {
        let line = line.trim_start();
        if line.trim_end().is_empty() || line.starts_with('#') {
            return Ok(None);
        }
        // The single whitespace character after the name is a delimiter, the
        // rest belongs to the arguments.
        let (name, rest) = match line.char_indices().find(|(_, c)| c.is_whitespace()) {
            Some((at, c)) => (&line[..at], &line[at + c.len_utf8()..]),
            None => (line, ""),
        };
        if name == "help" {
            return Ok(Some(self.help()));
        }
        let entry = self
            .commands
            .get(name)
            .ok_or_else(|| Error::Command(format!("unknown command `{name}`, try `help`")))?;
        let args = if entry.verbatim {
            vec![rest]
        } else {
            rest.split_whitespace().collect::<Vec<_>>()
        };
        debug!(name, ?args, "dispatching");
        (entry.handler)(app, &args).map(Some)
    }

    /// The toolbar, pointer and keyboard actions of the application.
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry
            .register_verbatim("load", "<path>  load an image", |app, rest| {
                let path = path_arg(rest, "load <path>")?;
                app.load(Path::new(path))?;
                let (w, h) = app.image().map(|it| it.dimensions()).unwrap_or_default();
                Ok(format!("loaded {path} ({w}x{h})"))
            })
            .register("rotate-left", "rotate 90° counter-clockwise", |app, args| {
                none(args, "rotate-left")?;
                app.rotate_left()?;
                Ok(format!("rotation {}°", app.status().rotation))
            })
            .register("rotate-right", "rotate 90° clockwise", |app, args| {
                none(args, "rotate-right")?;
                app.rotate_right()?;
                Ok(format!("rotation {}°", app.status().rotation))
            })
            .register("reset", "restore the image as loaded", |app, args| {
                none(args, "reset")?;
                app.reset_image()?;
                Ok("image restored".to_owned())
            })
            .register("scan", "run OCR over the image", |app, args| {
                none(args, "scan")?;
                let count = app.scan()?;
                Ok(format!("{count} words"))
            })
            .register("click", "<x> <y>  click at a viewport position", |app, args| {
                let [x, y] = numbers::<f64, 2>(args, "click <x> <y>")?;
                Ok(match app.click(ViewportPoint::new(x, y)) {
                    Some(text) => format!("appended {text:?}"),
                    None => "no word there".to_owned(),
                })
            })
            .register("zoom", "<delta>  zoom in (>0) or out (<0)", |app, args| {
                let [delta] = numbers::<i32, 1>(args, "zoom <delta>")?;
                app.zoom(delta);
                let viewer = app.viewer();
                Ok(format!("zoom step {} (scale {:.3})", viewer.zoom_step(), viewer.scale()))
            })
            .register("pan", "<dx> <dy>  drag the view", |app, args| {
                let [dx, dy] = numbers::<f64, 2>(args, "pan <dx> <dy>")?;
                Ok(if app.pan(dx, dy) {
                    "panned".to_owned()
                } else {
                    "nothing to drag".to_owned()
                })
            })
            .register("resize", "<w> <h>  resize the viewport", |app, args| {
                let [w, h] = numbers::<u32, 2>(args, "resize <w> <h>")?;
                if w == 0 || h == 0 {
                    return Err(Error::Command("viewport must be non-empty".to_owned()));
                }
                app.resize_viewport(w, h);
                Ok(format!("viewport {w}x{h}"))
            })
            .register("f1", "insert `;` or a newline, alternating", |app, args| {
                none(args, "f1")?;
                let separator = app.separator();
                Ok(format!("inserted {:?}", separator.as_str()))
            })
            .register_verbatim("type", "<text>  append text to the transcript", |app, text| {
                app.transcript_mut().push_str(text);
                Ok(format!("{} bytes", app.transcript().len()))
            })
            .register("text", "print the transcript", |app, args| {
                none(args, "text")?;
                Ok(app.transcript().text().to_owned())
            })
            .register("words", "list the recognized words", |app, args| {
                none(args, "words")?;
                let mut out = String::new();
                for (i, word) in app.overlay().iter().enumerate() {
                    let b = word.bounds;
                    let _ = writeln!(
                        out,
                        "{i:>4} {:>5} {:>5} {:>5} {:>5}  {}",
                        b.x, b.y, b.width, b.height, word.text
                    );
                }
                Ok(out.trim_end().to_owned())
            })
            .register_verbatim(
                "render",
                "<path>  write the current view to an image",
                |app, rest| {
                    let path = path_arg(rest, "render <path>")?;
                    app.render_to(Path::new(path))?;
                    Ok(format!("wrote {path}"))
                },
            )
            .register_verbatim("save", "<path>  save the transcript", |app, rest| {
                let path = path_arg(rest, "save <path>")?;
                let written = app.save(Path::new(path))?;
                Ok(format!("saved {}", written.display()))
            })
            .register("status", "show the current state", |app, args| {
                none(args, "status")?;
                let status = app.status();
                let dimensions = status
                    .dimensions
                    .map(|(w, h)| format!("{w}x{h}"))
                    .unwrap_or_else(|| "none".to_owned());
                Ok(format!(
                    "image {dimensions}, rotation {}°, {} words, zoom step {}, transcript {} bytes",
                    status.rotation, status.words, status.zoom_step, status.transcript_len
                ))
            });
        registry
    }
}

fn usage(usage: &str) -> Error {
    Error::Command(format!("usage: {usage}"))
}

fn none(args: &[&str], usage_line: &str) -> Result<()> {
    if args.is_empty() {
        Ok(())
    } else {
        Err(usage(usage_line))
    }
}

/// Paths may contain spaces; only surrounding whitespace is dropped.
fn path_arg<'a>(rest: &'a str, usage_line: &str) -> Result<&'a str> {
    match rest.trim() {
        "" => Err(usage(usage_line)),
        path => Ok(path),
    }
}

fn numbers<T: std::str::FromStr + Copy + Default, const N: usize>(
    args: &[&str],
    usage_line: &str,
) -> Result<[T; N]> {
    if args.len() != N {
        return Err(usage(usage_line));
    }
    let mut out = [T::default(); N];
    for (slot, arg) in out.iter_mut().zip(args) {
        *slot = arg.parse().map_err(|_| usage(usage_line))?;
    }
    Ok(out)
}
