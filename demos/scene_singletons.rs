//! Scene singletons example.
//!
//! A level places an `AudioManager` by hand while the `ScoreBoard` is created
//! on demand. Both survive the scene change; after shutdown neither is recreated.
//!
//! Run with: `cargo run --example scene_singletons`

use lifecycle_singleton::{BoxError, Scene, Singleton};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

struct AudioManager {
    volume: u8,
}

impl Singleton for AudioManager {
    fn create() -> Result<Self, BoxError> {
        Ok(AudioManager { volume: 80 })
    }

    fn torn_down(&self) {
        println!("   AudioManager released");
    }
}

struct ScoreBoard {
    points: AtomicU32,
}

impl Singleton for ScoreBoard {
    fn create() -> Result<Self, BoxError> {
        Ok(ScoreBoard {
            points: AtomicU32::new(0),
        })
    }

    fn initialized(&self) {
        println!("   ScoreBoard ready");
    }
}

fn main() {
    println!("=== Scene Singletons Example ===\n");

    let scene = Arc::new(Scene::new());
    lifecycle_singleton::set_host(scene.clone());

    // 1. Level load: a designer-placed audio manager and some scenery
    println!("1. Loading level...");
    scene.place(AudioManager { volume: 35 });
    scene.place("tree".to_string());
    scene.place("rock".to_string());
    println!("   Objects in scene: {}\n", scene.len());

    // 2. First access: found vs. created
    println!("2. Accessing singletons...");
    let audio = AudioManager::instance().expect("audio manager");
    println!("   AudioManager volume: {} (placed)", audio.volume);
    let score = ScoreBoard::instance().expect("score board");
    score.points.fetch_add(100, Ordering::SeqCst);
    println!("   Holder children: {:?}\n", scene.holder_children());

    // 3. Scene transition
    println!("3. Changing scene...");
    let dropped = scene.unload();
    println!("   Dropped {dropped} object(s), kept {}", scene.len());
    let score = ScoreBoard::instance().expect("score board");
    println!(
        "   Score carried over: {}\n",
        score.points.load(Ordering::SeqCst)
    );

    // 4. Shutdown
    println!("4. Quitting...");
    lifecycle_singleton::on_application_quit();
    println!("   ScoreBoard destroyed: {}", ScoreBoard::is_destroyed());
    println!(
        "   ScoreBoard after quit: {:?}",
        ScoreBoard::instance().map(|_| "instance")
    );

    println!("\n=== Example Complete ===");
}
