use handscript::{
    layout::{layout_page, wrap_paragraph, LayoutConstants, TextMeasure as _},
    paper::PAPER_COLOR,
    renderer::paint_page,
    surface::RecordingSurface,
    InkColor, PageRenderer, PaperBackground, RandomSampler, SequenceSampler, StyleConfig,
};
use image::RgbaImage;
use rand::{distributions::Alphanumeric, Rng as _, SeedableRng as _};

const ALL_STYLES: [StyleConfig; 6] = [
    StyleConfig {
        ink_color: InkColor::Blue,
        paper_background: PaperBackground::Ruled,
    },
    StyleConfig {
        ink_color: InkColor::Blue,
        paper_background: PaperBackground::Graph,
    },
    StyleConfig {
        ink_color: InkColor::Blue,
        paper_background: PaperBackground::Margin,
    },
    StyleConfig {
        ink_color: InkColor::Black,
        paper_background: PaperBackground::Ruled,
    },
    StyleConfig {
        ink_color: InkColor::Black,
        paper_background: PaperBackground::Graph,
    },
    StyleConfig {
        ink_color: InkColor::Black,
        paper_background: PaperBackground::Margin,
    },
];

fn page_surface() -> RecordingSurface {
    let constants = LayoutConstants::default();
    RecordingSurface::new(constants.page_width, constants.page_height, 11.0)
}

fn recorded_glyphs(text: &str, style: StyleConfig) -> Vec<(char, f32, f32)> {
    let mut surface = page_surface();
    paint_page(
        &mut surface,
        &mut SequenceSampler::neutral(),
        text,
        &style,
        &LayoutConstants::default(),
    )
    .unwrap();
    surface.painted_glyphs()
}

fn random_words(rng: &mut rand::rngs::StdRng, count: usize) -> String {
    (0..count)
        .map(|_| {
            let length = rng.gen_range(1..6);
            rng.clone()
                .sample_iter(&Alphanumeric)
                .take(length)
                .map(char::from)
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn decode(png_bytes: &[u8]) -> RgbaImage {
    image::load_from_memory(png_bytes).unwrap().to_rgba8()
}

/// Whether a pixel carries ink rather than paper or ruling, which are all light colors.
fn is_inked(pixel: &image::Rgba<u8>) -> bool {
    pixel.0[0] < 150
}

#[test]
fn greedy_wrap_needs_about_as_many_lines_as_the_text_is_wide() {
    let constants = LayoutConstants::default();
    let surface = page_surface();
    let mut rng = rand::rngs::StdRng::seed_from_u64(5);

    for _ in 0..50 {
        let word_count = rng.gen_range(1..60);
        let paragraph = random_words(&mut rng, word_count);
        let content_width = constants.content_width(PaperBackground::Ruled);

        let lines = wrap_paragraph(&paragraph, content_width, &surface);
        let total_width = surface.text_width(&paragraph);
        let expected_lines = (total_width / content_width).ceil() as usize;
        assert!(
            lines.len() + 1 >= expected_lines && lines.len() <= expected_lines + 1,
            "{} lines for {} expected",
            lines.len(),
            expected_lines
        );
        for line in &lines {
            assert!(surface.text_width(line) <= content_width);
        }
        similar_asserts::assert_eq!(lines.join(" "), paragraph);
    }
}

#[test]
fn the_ink_color_does_not_change_the_layout() {
    let text = "The quick brown fox jumps over the lazy dog.\n".repeat(12);
    for paper_background in [
        PaperBackground::Ruled,
        PaperBackground::Graph,
        PaperBackground::Margin,
    ] {
        let blue = recorded_glyphs(&text, StyleConfig::new(InkColor::Blue, paper_background));
        let black = recorded_glyphs(&text, StyleConfig::new(InkColor::Black, paper_background));
        similar_asserts::assert_eq!(blue, black);
    }
}

#[test]
fn margin_paper_indents_the_text_further_than_ruled_paper() {
    let text = "Indented words on every line of a long enough paragraph to wrap a few times over";
    for ink_color in [InkColor::Blue, InkColor::Black] {
        let ruled = recorded_glyphs(text, StyleConfig::new(ink_color, PaperBackground::Ruled));
        let margin = recorded_glyphs(text, StyleConfig::new(ink_color, PaperBackground::Margin));
        let leftmost = |glyphs: &[(char, f32, f32)]| {
            glyphs
                .iter()
                .map(|(_, x, _)| *x)
                .fold(f32::INFINITY, f32::min)
        };
        assert!(leftmost(&margin) > leftmost(&ruled));
    }
}

#[test]
fn an_over_wide_word_is_painted_in_full_on_its_own_line() {
    let long_word = "x".repeat(80);
    let text = format!("short {} tail", long_word);
    let glyphs = recorded_glyphs(&text, StyleConfig::default());

    assert_eq!(glyphs.len(), "short".len() + long_word.len() + "tail".len());
    let constants = LayoutConstants::default();
    let long_word_line = constants.first_baseline + constants.line_height;
    let long_word_glyphs = glyphs
        .iter()
        .filter(|(_, _, y)| *y == long_word_line)
        .collect::<Vec<_>>();
    assert_eq!(long_word_glyphs.len(), long_word.len());
    assert!(long_word_glyphs.iter().all(|(glyph, _, _)| *glyph == 'x'));
}

#[test]
fn hello_world_is_written_in_blue_on_the_first_line() {
    let renderer = PageRenderer::with_default_font().unwrap();
    let style = StyleConfig::new(InkColor::Blue, PaperBackground::Ruled);

    let recorded = recorded_glyphs("Hello world", style);
    assert_eq!(recorded.len(), 10);
    assert!(recorded.iter().all(|(_, _, y)| *y == 100.0));

    let page = renderer.render("Hello world", &style).unwrap();
    assert_eq!((page.width, page.height), (794, 1123));
    assert_eq!(page.lines_painted, 1);
    assert!(!page.truncated);

    let image = decode(&page.png);
    assert_eq!(image.dimensions(), (794, 1123));
    let inked = image
        .enumerate_pixels()
        .filter(|(_, _, pixel)| is_inked(pixel))
        .collect::<Vec<_>>();
    assert!(!inked.is_empty());
    assert!(inked.iter().all(|(x, y, _)| (70..110).contains(y) && *x >= 55 && *x < 734));

    let darkest = inked
        .iter()
        .map(|(_, _, pixel)| pixel.0)
        .min_by_key(|pixel| u32::from(pixel[0]) + u32::from(pixel[1]) + u32::from(pixel[2]))
        .unwrap();
    for channel in 0..3 {
        let difference = i32::from(darkest[channel]) - i32::from(InkColor::BLUE.0[channel]);
        assert!(difference.abs() <= 60, "{:?} is not blue ink", darkest);
    }
    assert!(darkest[2] > darkest[0] + 40);
}

#[test]
fn a_long_text_on_graph_paper_is_truncated_without_failing() {
    let renderer = PageRenderer::with_default_font().unwrap();
    let text = "word ".repeat(500);
    let page = renderer
        .render(&text, &StyleConfig::new(InkColor::Black, PaperBackground::Graph))
        .unwrap();
    assert!(page.truncated);
    assert_eq!(
        page.lines_painted,
        LayoutConstants::default().line_capacity()
    );
    assert_eq!(decode(&page.png).dimensions(), (794, 1123));
}

#[test]
fn empty_text_gives_a_blank_page() {
    let renderer = PageRenderer::with_default_font().unwrap();
    for style in ALL_STYLES {
        let page = renderer.render("", &style).unwrap();
        assert_eq!(page.lines_painted, 0);
        assert!(!page.truncated);

        let image = decode(&page.png);
        assert!(!image.pixels().any(is_inked));
        let corner = image.get_pixel(0, 0).0;
        assert_eq!(corner[..3], PAPER_COLOR.0);
    }
}

#[test]
fn rendering_twice_gives_two_different_pages() {
    let renderer = PageRenderer::with_default_font().unwrap();
    let style = StyleConfig::default();
    let first = renderer.render("Hello world", &style).unwrap();
    let second = renderer.render("Hello world", &style).unwrap();
    assert_ne!(decode(&first.png).as_raw(), decode(&second.png).as_raw());
}

#[test]
fn a_seeded_sampler_reproduces_the_page() {
    let renderer = PageRenderer::with_default_font().unwrap();
    let style = StyleConfig::new(InkColor::Black, PaperBackground::Margin);
    let first = renderer
        .render_with_sampler("Same every time", &style, &mut RandomSampler::seeded(9))
        .unwrap();
    let second = renderer
        .render_with_sampler("Same every time", &style, &mut RandomSampler::seeded(9))
        .unwrap();
    assert_eq!(first, second);
}

#[test]
fn concurrent_renders_do_not_interfere() {
    let renderer = PageRenderer::with_default_font().unwrap();
    let style = StyleConfig::default();
    let expected = renderer
        .render_with_sampler("In parallel", &style, &mut RandomSampler::seeded(1))
        .unwrap();

    std::thread::scope(|scope| {
        let handles = (0..4)
            .map(|_| {
                scope.spawn(|| {
                    renderer
                        .render_with_sampler("In parallel", &style, &mut RandomSampler::seeded(1))
                        .unwrap()
                })
            })
            .collect::<Vec<_>>();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), expected);
        }
    });
}

#[test]
fn layout_and_painting_agree_on_the_lines() {
    let constants = LayoutConstants::default();
    let text = "alpha beta gamma delta epsilon zeta eta theta iota kappa lambda mu\nnu xi omicron";
    let surface = page_surface();
    let style = StyleConfig::new(InkColor::Blue, PaperBackground::Margin);
    let layout = layout_page(text, style.paper_background, &constants, &surface);

    let glyphs = recorded_glyphs(text, style);
    let painted_lines = {
        let mut baselines = glyphs.iter().map(|(_, _, y)| *y).collect::<Vec<_>>();
        baselines.dedup();
        baselines
    };
    let laid_out_lines = layout
        .lines
        .iter()
        .map(|line| line.baseline_y)
        .collect::<Vec<_>>();
    assert_eq!(painted_lines, laid_out_lines);
}
