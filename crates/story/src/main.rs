use gpui::*;
use gpui_component::Root;

use gpui_folder_story::folder_tree::FolderTreeExample;

fn main() {
    let env_filter = match std::env::var("RUST_LOG").ok() {
        Some(val) => tracing_subscriber::EnvFilter::new(val),
        None => tracing_subscriber::EnvFilter::new("info,gpui_folder=debug,gpui_folder_core=debug"),
    };
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let app = Application::new();

    app.run(move |cx| {
        gpui_component::init(cx);
        cx.activate(true);

        cx.spawn(async move |cx| {
            cx.open_window(
                WindowOptions {
                    titlebar: Some(TitlebarOptions {
                        title: Some("Folder".into()),
                        appears_transparent: false,
                        traffic_light_position: None,
                    }),
                    ..Default::default()
                },
                |window, cx| {
                    let view = FolderTreeExample::view(window, cx);
                    cx.new(|cx| Root::new(view, window, cx))
                },
            )?;

            Ok::<_, anyhow::Error>(())
        })
        .detach();
    });
}
