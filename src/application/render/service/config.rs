use comrak::options::Options;

use crate::application::render::types::ExtensionSet;

/// Comrak options for the requested extension set.
///
/// Raw HTML stays enabled at the comrak level because the rewrite stage emits
/// highlighted code, headings and the table of contents as HTML nodes. When
/// the user disables raw HTML the rewrite stage escapes the author's own
/// HTML nodes instead.
pub(crate) fn options_for(extensions: &ExtensionSet) -> Options<'static> {
    let mut options = Options::default();
    configure_extensions(&mut options, extensions);
    options
}

fn configure_extensions(options: &mut Options<'static>, extensions: &ExtensionSet) {
    let ext = &mut options.extension;
    ext.table = extensions.tables;
    ext.tagfilter = false;

    let render = &mut options.render;
    render.github_pre_lang = true;
    render.full_info_string = true;
    render.r#unsafe = true;
    render.sourcepos = false;
}
