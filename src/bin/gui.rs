//! GUI application for previewing the selfie framing guide over a photo.
//!
//! Run with: cargo run --features gui --bin selfie-guide-gui

use std::path::PathBuf;
use std::sync::Arc;

use eframe::egui;
use image::{imageops, DynamicImage, RgbaImage};
use selfie_guide::{
    guide_rect, FaceDetector, FaceEffects, FacingMode, Frame, FrameFeed, GraphicOverlay,
    Orientation, RustfaceDetector, RustfaceSettings,
};
use tracing_subscriber::EnvFilter;

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([1024.0, 768.0]),
        ..Default::default()
    };

    eframe::run_native(
        "selfie-guide - Framing Guide Preview",
        options,
        Box::new(|cc| Ok(Box::new(GuideApp::new(cc)))),
    )
}

struct GuideApp {
    // Image state
    photo: Option<DynamicImage>,
    display_texture: Option<egui::TextureHandle>,

    // Detection
    detector: Option<RustfaceDetector>,
    frame: Option<Frame>,
    status: String,

    // Overlay
    overlay: Option<Arc<GraphicOverlay>>,
    feed: Option<FrameFeed>,
    facing: FacingMode,
    orientation: Orientation,

    // Settings
    min_face_size: u32,
    detector_model_path: String,
}

impl GuideApp {
    fn new(_cc: &eframe::CreationContext<'_>) -> Self {
        Self {
            photo: None,
            display_texture: None,
            detector: None,
            frame: None,
            status: "Load an image and a face detector to begin".to_string(),
            overlay: None,
            feed: None,
            facing: FacingMode::Front,
            // Still photos arrive upright, so no axis swap by default.
            orientation: Orientation::Landscape,
            min_face_size: 20,
            detector_model_path: "seeta_fd_frontal_v1.0.bin".to_string(),
        }
    }

    fn load_detector(&mut self) {
        let settings = RustfaceSettings {
            min_face_size: self.min_face_size,
            ..RustfaceSettings::default()
        };
        match RustfaceDetector::load(&self.detector_model_path, settings) {
            Ok(detector) => {
                self.detector = Some(detector);
                self.status = "Face detector loaded".to_string();
            }
            Err(e) => {
                self.status = format!("Failed to load face detector: {}", e);
            }
        }
    }

    fn load_image(&mut self, path: PathBuf) {
        match image::open(&path) {
            Ok(img) => {
                let surface = GraphicOverlay::new(img.width(), img.height());
                match surface {
                    Ok(overlay) => {
                        let overlay = Arc::new(overlay);
                        self.feed = Some(FrameFeed::new(overlay.clone()));
                        self.overlay = Some(overlay);
                        self.photo = Some(img);
                        self.frame = None;
                        self.apply_modes();
                        self.status = format!("Loaded: {}", path.display());
                    }
                    Err(e) => {
                        self.status = format!("Unusable image: {}", e);
                    }
                }
            }
            Err(e) => {
                self.status = format!("Failed to load image: {}", e);
            }
        }
    }

    fn load_frame(&mut self, path: PathBuf) {
        match Frame::load(&path) {
            Ok(frame) => {
                self.status = format!("Loaded {} face(s) from {}", frame.faces.len(), path.display());
                self.present(frame);
            }
            Err(e) => {
                self.status = format!("Failed to load frame: {}", e);
            }
        }
    }

    fn detect_faces(&mut self) {
        let Some(ref img) = self.photo else {
            self.status = "No image loaded".to_string();
            return;
        };

        let Some(ref detector) = self.detector else {
            self.status = "Face detector not loaded".to_string();
            return;
        };

        let frame = detector.detect_frame(img);
        self.status = format!("Detected {} face(s)", frame.faces.len());
        self.present(frame);
    }

    fn present(&mut self, frame: Frame) {
        if let Some(ref mut feed) = self.feed {
            feed.present(frame.clone());
        }
        self.frame = Some(frame);
    }

    fn apply_modes(&mut self) {
        if let Some(ref overlay) = self.overlay {
            overlay.set_facing_mode(self.facing);
            overlay.set_orientation(self.orientation);
            overlay.request_redraw();
        }
    }

    fn render_preview(&mut self, ctx: &egui::Context) {
        let (Some(img), Some(overlay)) = (&self.photo, &self.overlay) else {
            return;
        };

        let layer = overlay.render_to_image();
        let (width, height) = layer.dimensions();

        let mut base: RgbaImage = img
            .resize_to_fill(width, height, imageops::FilterType::Triangle)
            .to_rgba8();
        if overlay.facing_mode().is_front() {
            imageops::flip_horizontal_in_place(&mut base);
        }
        imageops::overlay(&mut base, &layer, 0, 0);

        // Convert to egui texture
        let size = [width as usize, height as usize];
        let pixels: Vec<egui::Color32> = base
            .pixels()
            .map(|p| egui::Color32::from_rgba_unmultiplied(p[0], p[1], p[2], p[3]))
            .collect();

        let color_image = egui::ColorImage { size, pixels };
        self.display_texture = Some(ctx.load_texture("preview", color_image, Default::default()));
    }

    fn face_lines(&self) -> Vec<String> {
        let (Some(frame), Some(overlay)) = (&self.frame, &self.overlay) else {
            return Vec::new();
        };

        let transform = overlay.transform().for_source(frame.source);
        let guide = guide_rect(overlay.surface(), overlay.style());

        frame
            .faces
            .iter()
            .enumerate()
            .map(|(i, face)| {
                let mapped = transform.map_box(&face.bounding_box).normalized();
                let effects = FaceEffects::evaluate(face, overlay.style());
                format!(
                    "  Face {}: {:.0}x{:.0} {}{}{}",
                    i + 1,
                    mapped.width(),
                    mapped.height(),
                    if guide.contains(&mapped) { "inside" } else { "outside" },
                    if effects.smile { ", smiling" } else { "" },
                    if effects.blink { ", blinking" } else { "" },
                )
            })
            .collect()
    }
}

impl eframe::App for GuideApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::TopBottomPanel::top("menu").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("Open Image...").clicked() {
                        if let Some(path) = rfd::FileDialog::new()
                            .add_filter("Images", &["png", "jpg", "jpeg", "bmp", "gif"])
                            .pick_file()
                        {
                            self.load_image(path);
                        }
                        ui.close_menu();
                    }
                    if ui.button("Open Frame...").clicked() {
                        if let Some(path) = rfd::FileDialog::new()
                            .add_filter("Frame", &["json"])
                            .pick_file()
                        {
                            self.load_frame(path);
                        }
                        ui.close_menu();
                    }
                    if ui.button("Quit").clicked() {
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                });
            });
        });

        egui::SidePanel::left("controls").min_width(250.0).show(ctx, |ui| {
            ui.heading("Detector");
            ui.separator();

            ui.label("Face Detector Model:");
            ui.text_edit_singleline(&mut self.detector_model_path);
            ui.add(egui::Slider::new(&mut self.min_face_size, 10..=100).text("Min Face Size"));
            if ui.button("Load Face Detector").clicked() {
                self.load_detector();
            }
            if ui.button("Detect Faces").clicked() {
                self.detect_faces();
            }
            ui.add_space(16.0);

            ui.heading("Camera");
            ui.separator();

            let facing_label = match self.facing {
                FacingMode::Front => "Facing: front",
                FacingMode::Back => "Facing: back",
            };
            if ui.button(facing_label).clicked() {
                self.facing = self.facing.toggled();
                self.apply_modes();
            }

            let orientation_label = match self.orientation {
                Orientation::Portrait => "Orientation: portrait",
                Orientation::Landscape => "Orientation: landscape",
            };
            if ui.button(orientation_label).clicked() {
                self.orientation = match self.orientation {
                    Orientation::Portrait => Orientation::Landscape,
                    Orientation::Landscape => Orientation::Portrait,
                };
                self.apply_modes();
            }
            ui.add_space(16.0);

            ui.heading("Status");
            ui.separator();
            ui.label(&self.status);

            let lines = self.face_lines();
            if !lines.is_empty() {
                ui.add_space(8.0);
                ui.label(format!("Faces found: {}", lines.len()));
                for line in lines {
                    ui.label(line);
                }
            }
        });

        // Mode toggles and new frames both leave a redraw pending.
        let redraw = self
            .overlay
            .as_ref()
            .is_some_and(|overlay| overlay.take_redraw_request());
        if redraw || (self.photo.is_some() && self.display_texture.is_none()) {
            self.render_preview(ctx);
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            if let Some(ref texture) = self.display_texture {
                let available_size = ui.available_size();
                let texture_size = texture.size_vec2();

                // Scale to fit
                let scale = (available_size.x / texture_size.x)
                    .min(available_size.y / texture_size.y)
                    .min(1.0);
                let display_size = texture_size * scale;

                ui.centered_and_justified(|ui| {
                    ui.image((texture.id(), display_size));
                });
            } else {
                ui.centered_and_justified(|ui| {
                    ui.heading("Drag and drop an image or use File > Open");
                });
            }
        });

        // Handle drag and drop
        ctx.input(|i| {
            for file in &i.raw.dropped_files {
                if let Some(path) = &file.path {
                    self.load_image(path.clone());
                }
            }
        });
    }
}
