//! Terminal slideshow player.
//!
//! Opens a database file and plays the slideshow from its first image,
//! reading one command per line from stdin and printing the session's
//! events as they happen.

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    if let Err(e) = cli::run() {
        eprintln!("hyperslide: {}", e);
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {}

#[cfg(not(target_arch = "wasm32"))]
mod cli {
    use std::error::Error;
    use std::io::{self, BufRead, Write};
    use std::path::PathBuf;

    use hyperslide::coords::{PixelPoint, fit_contain};
    use hyperslide::navigation::ChoiceHandle;
    use hyperslide::storage::image_record_for_file;
    use hyperslide::{
        Activation, AppConfig, JsonFileStorage, PixelRect, Session, SessionEvent, Warning,
    };

    /// Virtual stage the images are fitted into.
    const STAGE: PixelRect = PixelRect {
        left: 0.0,
        top: 0.0,
        width: 1280.0,
        height: 720.0,
    };

    const HELP: &str = "\
commands:
  images              list images
  regions             list regions of the current image
  go <region-id>      activate a region
  pick <n>            answer a link choice
  load <image-id>     show an image
  add <file> [text]   import an image file
  unlock | lock       toggle editing
  draw x1 y1 x2 y2    draw a region (stage pixels, editing unlocked)
  config              write the current settings to the config file
  quit";

    pub fn run() -> Result<(), Box<dyn Error>> {
        let config = AppConfig::load_from_default_path();
        env_logger::Builder::new()
            .filter_level(config.preferences.log_level.to_level_filter())
            .parse_default_env()
            .init();

        let database = std::env::args_os()
            .nth(1)
            .map(PathBuf::from)
            .unwrap_or_else(|| config.preferences.database_path.clone());
        let storage = JsonFileStorage::open(&database)?;
        let mut session = Session::open(storage, config.session_settings())?;

        let mut player = Player::default();
        player.start(&mut session);
        println!("{}", HELP);

        let stdin = io::stdin();
        let mut line = String::new();
        loop {
            print!("> ");
            io::stdout().flush()?;
            line.clear();
            if stdin.lock().read_line(&mut line)? == 0 {
                break;
            }
            let mut words = line.split_whitespace();
            let Some(command) = words.next() else {
                continue;
            };
            let arg = words.next();

            match (command, arg) {
                ("quit" | "exit" | "q", _) => break,
                ("help" | "?", _) => println!("{}", HELP),
                ("images", _) => list_images(&session),
                ("regions", _) => list_regions(&session),
                ("go", Some(region_id)) => player.go(&mut session, region_id),
                ("pick", Some(n)) => match n.parse::<usize>() {
                    Ok(n) => player.pick(&mut session, n),
                    Err(_) => println!("not a number: {}", n),
                },
                ("load", Some(image_id)) => player.load(&mut session, image_id),
                ("add", Some(file)) => {
                    let description = words.collect::<Vec<_>>().join(" ");
                    match image_record_for_file(file, description) {
                        Ok(image) => {
                            println!("added {} as {}", image.display_name(), image.id);
                            session.register_image(image);
                        }
                        Err(e) => println!("cannot add {}: {}", file, e),
                    }
                }
                ("unlock", _) => session.unlock_editing(),
                ("lock", _) => session.lock_editing(),
                ("draw", Some(first)) => {
                    let coords: Result<Vec<f64>, _> = std::iter::once(first)
                        .chain(words)
                        .map(str::parse::<f64>)
                        .collect();
                    match coords.as_deref() {
                        Ok(&[x1, y1, x2, y2]) => {
                            draw(&mut session, PixelPoint::new(x1, y1), PixelPoint::new(x2, y2))
                        }
                        _ => println!("usage: draw x1 y1 x2 y2"),
                    }
                }
                ("config", _) => match config.save_to_default_path() {
                    Ok(path) => println!("configuration written to {}", path.display()),
                    Err(e) => println!("cannot write configuration: {}", e),
                },
                _ => println!("unknown command, try 'help'"),
            }

            session.poll_resize();
            print_events(&mut session);
        }
        Ok(())
    }

    /// Host-side state: the open prompt, if any.
    #[derive(Default)]
    struct Player {
        prompt: Option<ChoiceHandle>,
    }

    impl Player {
        fn start(&mut self, session: &mut Session<JsonFileStorage>) {
            if session.start().is_none() {
                println!("The library is empty. Use 'add <file>' to import an image.");
            }
            layout(session);
            print_events(session);
        }

        fn load(&mut self, session: &mut Session<JsonFileStorage>, image_id: &str) {
            session.load_image(image_id);
            layout(session);
        }

        fn go(&mut self, session: &mut Session<JsonFileStorage>, region_id: &str) {
            match session.activate(region_id) {
                Activation::Navigate(pending) => {
                    session.perform_load(&pending);
                    layout(session);
                }
                Activation::Choose(prompt) => self.prompt = Some(prompt.handle),
                Activation::NotViewing => println!("no image is shown"),
                Activation::Busy | Activation::NoLink { .. } => {}
            }
        }

        fn pick(&mut self, session: &mut Session<JsonFileStorage>, selection: usize) {
            let Some(handle) = self.prompt else {
                println!("nothing to choose");
                return;
            };
            match session.resolve_choice(handle, selection) {
                Some(pending) => {
                    self.prompt = None;
                    session.perform_load(&pending);
                    layout(session);
                }
                None => println!("no choice {}", selection),
            }
        }
    }

    /// Draw a region as a drag from `from` to `to`.
    fn draw(session: &mut Session<JsonFileStorage>, from: PixelPoint, to: PixelPoint) {
        if !session.arm_draw() {
            let reason = if session.interaction().is_locked() {
                "editing is locked, use 'unlock'"
            } else {
                "no image is shown"
            };
            println!("cannot draw: {}", reason);
            return;
        }
        session.pointer_down(from, None);
        match session.pointer_up(to) {
            Ok(Some(region)) => println!("drew {} \"{}\"", region.id, region.name),
            Ok(None) => println!("box too small, nothing drawn"),
            Err(e) => println!("cannot draw: {}", e),
        }
    }

    /// Fit the current image into the stage.
    fn layout(session: &mut Session<JsonFileStorage>) {
        let natural = session.current_image().and_then(|image| image.dimensions);
        let rect = match natural {
            Some(size) => fit_contain(STAGE, size).unwrap_or(STAGE),
            None => STAGE,
        };
        if session.viewport() != Some(rect) {
            session.set_viewport(rect);
        }
    }

    fn list_images(session: &Session<JsonFileStorage>) {
        let current = session.current_image_id();
        for image in session.regions().images() {
            let marker = if Some(image.id.as_str()) == current { "*" } else { " " };
            println!(
                "{} {}  {} ({} regions)",
                marker,
                image.id,
                image.display_name(),
                image.regions.len()
            );
        }
    }

    fn list_regions(session: &Session<JsonFileStorage>) {
        let Some(image) = session.current_image() else {
            println!("no image is shown");
            return;
        };
        for (region_id, linked) in session.link_indicators() {
            let name = image
                .region(&region_id)
                .map(|r| r.name.as_str())
                .unwrap_or_default();
            println!("  {}  {}{}", region_id, name, if linked { "  ->" } else { "" });
        }
        if let Some(summary) = session.summary() {
            println!(
                "  {} regions, {} linked, {} links touching this image",
                summary.region_count, summary.linked_regions, summary.links_touching
            );
        }
    }

    fn print_events(session: &mut Session<JsonFileStorage>) {
        for event in session.drain_events() {
            match event {
                SessionEvent::ViewCleared => {}
                SessionEvent::RegionGeometry {
                    region_id,
                    name,
                    rect,
                } => println!(
                    "region {} \"{}\" at ({:.0}, {:.0}) {:.0}x{:.0}",
                    region_id, name, rect.left, rect.top, rect.width, rect.height
                ),
                SessionEvent::RegionRemoved { region_id } => {
                    println!("region {} removed", region_id)
                }
                SessionEvent::LinkIndicator { .. } => {}
                SessionEvent::LinkRemoved { link_id } => println!("link {} removed", link_id),
                SessionEvent::Navigated { image_id, .. } => {
                    let name = session
                        .regions()
                        .image(&image_id)
                        .map(|i| i.display_name().to_string())
                        .unwrap_or_else(|_| image_id.clone());
                    println!("showing {} ({})", name, image_id);
                }
                SessionEvent::Highlight { region_id, .. } => {
                    println!("highlight {}", region_id)
                }
                SessionEvent::ChoiceRequested(prompt) => {
                    println!("This region has several links:");
                    for choice in &prompt.choices {
                        println!("  {}. {}", choice.index, choice.link.target_image_id);
                    }
                    println!("answer with 'pick <n>'");
                }
                SessionEvent::Soundtrack { track: Some(track) } => {
                    println!("now playing: {}", track.title())
                }
                SessionEvent::Soundtrack { track: None } => println!("music stopped"),
                SessionEvent::ImageClosed { image_id } => println!("{} was deleted", image_id),
                SessionEvent::Warning(warning @ Warning::NoLink { .. }) => {
                    println!("{}", warning)
                }
                SessionEvent::Warning(warning) => println!("warning: {}", warning),
            }
        }
    }
}
