//! Movie Tracker
//! Desktop client for searching movies, logging what you watched and charting
//! your watch history against a movie tracker backend.

// Hide console window on Windows release builds
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

// Use mimalloc for faster memory allocation (Linux, macOS)
#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use eframe::egui;

mod api;
mod app;
mod charts;
mod config;
mod console;
mod controller;
mod history;
mod models;
mod sync;

use app::MovieTrackerApp;
use config::AppConfig;

/// Film-frame icon drawn procedurally so no image assets are needed
fn load_icon() -> egui::IconData {
    let size: usize = 64;
    let mut rgba = vec![0u8; size * size * 4];

    for y in 0..size {
        for x in 0..size {
            let idx = (y * size + x) * 4;
            let nx = x as f32 / size as f32;
            let ny = y as f32 / size as f32;

            // Rounded square background
            let corner = 0.125;
            let dx = (corner - nx).max(nx - (1.0 - corner)).max(0.0);
            let dy = (corner - ny).max(ny - (1.0 - corner)).max(0.0);
            if dx * dx + dy * dy > corner * corner {
                continue;
            }

            // Sprocket holes down both edges
            let in_strip = nx < 0.2 || nx > 0.8;
            let hole = in_strip && (ny * 6.0).fract() > 0.35 && (ny * 6.0).fract() < 0.75 && (nx - 0.1).abs().min((nx - 0.9).abs()) < 0.05;
            // Play triangle in the frame
            let px = nx - 0.38;
            let py = ny - 0.5;
            let in_play = px >= 0.0 && px <= 0.28 && py.abs() <= (0.28 - px) * 0.65;

            let (r, g, b) = if hole {
                (235, 235, 235)
            } else if in_play {
                (255, 200, 60)
            } else if in_strip {
                (30, 30, 40)
            } else {
                // Deep red to crimson gradient
                let t = nx * 0.5 + ny * 0.5;
                ((150.0 + 60.0 * t) as u8, (30.0 + 10.0 * t) as u8, (45.0 + 20.0 * t) as u8)
            };

            rgba[idx] = r;
            rgba[idx + 1] = g;
            rgba[idx + 2] = b;
            rgba[idx + 3] = 255;
        }
    }

    egui::IconData { rgba, width: size as u32, height: size as u32 }
}

/// First system emoji font found, appended as a proportional fallback
fn add_emoji_font(fonts: &mut egui::FontDefinitions) {
    let candidates: &[&str] = if cfg!(target_os = "windows") {
        &["C:\\Windows\\Fonts\\seguiemj.ttf"]
    } else if cfg!(target_os = "macos") {
        &["/System/Library/Fonts/Apple Color Emoji.ttc"]
    } else {
        &[
            "/usr/share/fonts/truetype/noto/NotoColorEmoji.ttf",
            "/usr/share/fonts/noto-emoji/NotoColorEmoji.ttf",
            "/usr/share/fonts/google-noto-emoji/NotoColorEmoji.ttf",
            "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
        ]
    };

    for path in candidates {
        if let Ok(font_data) = std::fs::read(path) {
            fonts.font_data.insert("emoji".to_owned(), egui::FontData::from_owned(font_data).into());
            fonts.families.entry(egui::FontFamily::Proportional).or_default().push("emoji".to_owned());
            log::info!("Loaded emoji font from {}", path);
            return;
        }
    }
}

fn main() -> Result<(), eframe::Error> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = AppConfig::load();
    log::info!("Using backend {}", config.base_url());

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([900.0, 600.0])
            .with_icon(load_icon()),
        vsync: true,
        hardware_acceleration: eframe::HardwareAcceleration::Preferred,
        ..Default::default()
    };

    eframe::run_native(
        "Movie Tracker",
        options,
        Box::new(|cc| {
            let mut fonts = egui::FontDefinitions::default();
            add_emoji_font(&mut fonts);
            cc.egui_ctx.set_fonts(fonts);

            Ok(Box::new(MovieTrackerApp::new(config)))
        }),
    )
}
