//! HTML rendering for the web pages
//!
//! Every page shares one layout: navigation bar, flash area, content.
//! Values coming from users, models or the metadata API always go through
//! [`escape`].

use axum::response::Html;
use quick_xml::escape::escape;

use crate::domain::{BookInformation, GenrePrediction, Page};
use crate::infrastructure::session::{Flash, StagedUpload};
use crate::modules::integrations::BookDetails;

const NAV_ITEMS: [(&str, &str); 5] = [
    ("Home", "/"),
    ("Upload Book Cover", "/uploadImage"),
    ("Show Books Genre Pred Database", "/show_all_genre_pred?page=1"),
    ("Show Books Info Pred Database", "/show_all_book_info?page=1"),
    ("About Us", "/about_us"),
];

const STYLE: &str = r#"
        body { font-family: system-ui, -apple-system, sans-serif; max-width: 960px; margin: 0 auto; padding: 0 20px 40px; line-height: 1.5; color: #222; }
        nav { display: flex; gap: 16px; padding: 14px 0; border-bottom: 2px solid #0066cc; margin-bottom: 24px; flex-wrap: wrap; }
        nav a { color: #0066cc; text-decoration: none; font-weight: 600; }
        .flash { padding: 10px 14px; border-radius: 4px; margin-bottom: 12px; }
        .flash.error { background: #fde8e8; color: #9b1c1c; }
        .flash.warning { background: #fdf6b2; color: #723b13; }
        .flash.success { background: #def7ec; color: #03543f; }
        .cover { max-width: 280px; border: 1px solid #ddd; }
        .prediction { display: flex; gap: 32px; align-items: flex-start; }
        table { border-collapse: collapse; width: 100%; }
        th, td { text-align: left; padding: 6px 10px; border-bottom: 1px solid #eee; }
        th { background: #f4f6f8; }
        dt { font-weight: 600; }
        dd { margin: 0 0 8px 0; }
        .pager { display: flex; gap: 16px; margin-top: 16px; }
        button, input[type=submit] { padding: 8px 18px; margin-right: 8px; }
"#;

pub fn layout(title: &str, flashes: &[Flash], content: &str) -> Html<String> {
    let nav: String = NAV_ITEMS
        .iter()
        .map(|(label, href)| format!(r#"<a href="{}">{}</a>"#, escape(href), label))
        .collect();

    let flash_html: String = flashes
        .iter()
        .map(|f| {
            format!(
                r#"<div class="flash {}">{}</div>"#,
                f.kind.as_str(),
                escape(&f.message)
            )
        })
        .collect();

    Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title} - CoverLens</title>
    <style>{STYLE}</style>
</head>
<body>
    <nav>{nav}</nav>
    {flash_html}
    <main>
    <h1>{title}</h1>
    {content}
    </main>
</body>
</html>"#,
        title = escape(title),
    ))
}

fn cover_url(file_name: &str) -> String {
    format!("/static/{}", urlencoding::encode(file_name))
}

fn details_list(details: &BookDetails) -> String {
    let link = if details.info_link.starts_with("https://") || details.info_link.starts_with("http://") {
        format!(
            r#"<a href="{0}" target="_blank" rel="noopener">{0}</a>"#,
            escape(&details.info_link)
        )
    } else {
        escape(&details.info_link).into_owned()
    };

    format!(
        r#"<dl>
        <dt>Title</dt><dd>{}</dd>
        <dt>Author(s)</dt><dd>{}</dd>
        <dt>Genre</dt><dd>{}</dd>
        <dt>Publisher</dt><dd>{}</dd>
        <dt>More information</dt><dd>{}</dd>
    </dl>"#,
        escape(&details.title),
        escape(&details.authors),
        escape(&details.categories),
        escape(&details.publisher),
        link
    )
}

fn genre_list(genre: &str, confidence: &str, file_name: &str) -> String {
    format!(
        r#"<dl>
        <dt>Predicted genre</dt><dd>{}</dd>
        <dt>Confidence</dt><dd>{}</dd>
        <dt>File name</dt><dd>{}</dd>
    </dl>"#,
        escape(genre),
        escape(confidence),
        escape(file_name)
    )
}

/// Home page with a worked example
pub fn home(flashes: &[Flash], example_image: &str, genre: &GenrePrediction, info: &BookDetails) -> Html<String> {
    let content = format!(
        r#"<p>Upload a photo of a book cover: CoverLens predicts its genre, reads the title and author,
    and looks the book up on Google Books so you can confirm and save it.</p>
    <h2>Example</h2>
    <div class="prediction">
        <img class="cover" src="{}" alt="Example book cover">
        <div>
            <h3>Genre prediction</h3>
            {}
            <h3>Book information</h3>
            {}
        </div>
    </div>
    <p><a href="/uploadImage">Upload your own cover</a></p>"#,
        escape(example_image),
        genre_list(&genre.genre, &genre.confidence, &genre.file_name),
        details_list(info)
    );
    layout("Book Cover Genre Prediction", flashes, &content)
}

pub fn about(flashes: &[Flash]) -> Html<String> {
    let content = r#"<p>CoverLens combines an image classifier trained on book covers with an
    OCR model that reads the title and author printed on them. The text is matched against
    Google Books, and every prediction you confirm is kept so the models can be evaluated
    against real covers.</p>
    <p>Source code and model details are available from the project maintainers.</p>"#;
    layout("About Us", flashes, content)
}

pub fn upload_form(flashes: &[Flash]) -> Html<String> {
    let content = r#"<p>Accepted formats: png, jpg, jpeg.</p>
    <form method="post" action="/uploadImage" enctype="multipart/form-data">
        <input type="file" name="file" accept=".png,.jpg,.jpeg">
        <input type="submit" value="Upload">
    </form>"#;
    layout("Upload Book Cover", flashes, content)
}

pub fn check_details(flashes: &[Flash], upload: &StagedUpload, details: &BookDetails) -> Html<String> {
    let content = format!(
        r#"<div class="prediction">
        <img class="cover" src="{}" alt="Uploaded book cover">
        <div>
            <h3>Genre prediction</h3>
            {}
            <h3>Book information</h3>
            {}
            <form method="post" action="/checkbookDetails">
                <p>Are these details correct?</p>
                <button type="submit" name="confirm_details_button" value="Yes">Yes</button>
                <button type="submit" name="confirm_details_button" value="No">No</button>
            </form>
        </div>
    </div>"#,
        escape(&cover_url(&upload.file_name)),
        genre_list(
            &upload.genre.genre,
            &upload.genre.confidence_text(),
            &upload.file_name
        ),
        details_list(details)
    );
    layout("Check Book Details", flashes, &content)
}

pub fn edit_details(flashes: &[Flash], upload: &StagedUpload) -> Html<String> {
    let content = format!(
        r#"<div class="prediction">
        <img class="cover" src="{}" alt="Uploaded book cover">
        <div>
            <h3>Genre prediction</h3>
            {}
            <h3>Correct the title and author</h3>
            <form method="post" action="/editbookDetails">
                <p><label>Title<br><input type="text" name="updatedbooktitle" value="{}" size="40"></label></p>
                <p><label>Author<br><input type="text" name="updatedbookauthor" value="{}" size="40"></label></p>
                <input type="submit" value="Search and save">
            </form>
        </div>
    </div>"#,
        escape(&cover_url(&upload.file_name)),
        genre_list(
            &upload.genre.genre,
            &upload.genre.confidence_text(),
            &upload.file_name
        ),
        escape(&upload.cover.pred_title),
        escape(&upload.cover.pred_author)
    );
    layout("Edit Book Details", flashes, &content)
}

fn pager<T>(base: &str, page: &Page<T>) -> String {
    let mut html = String::from(r#"<div class="pager">"#);
    if page.has_previous() {
        html.push_str(&format!(
            r#"<a href="{}?page={}">&laquo; Previous</a>"#,
            base,
            page.page - 1
        ));
    }
    html.push_str(&format!(
        "<span>Page {} of {} ({} records)</span>",
        page.page,
        page.total_pages.max(1),
        page.total
    ));
    if page.has_next() {
        html.push_str(&format!(
            r#"<a href="{}?page={}">Next &raquo;</a>"#,
            base,
            page.page + 1
        ));
    }
    html.push_str("</div>");
    html
}

pub fn genre_predictions(flashes: &[Flash], page: &Page<GenrePrediction>) -> Html<String> {
    let rows: String = page
        .items
        .iter()
        .map(|p| {
            format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                p.id,
                escape(&p.genre),
                escape(&p.confidence),
                escape(&p.file_name)
            )
        })
        .collect();

    let content = format!(
        r#"<table>
        <thead><tr><th>#</th><th>Genre</th><th>Confidence</th><th>File name</th></tr></thead>
        <tbody>{}</tbody>
    </table>
    {}"#,
        if rows.is_empty() {
            r#"<tr><td colspan="4">No predictions saved yet.</td></tr>"#.to_string()
        } else {
            rows
        },
        pager("/show_all_genre_pred", page)
    );
    layout("Genre Predictions", flashes, &content)
}

pub fn book_information(flashes: &[Flash], page: &Page<BookInformation>) -> Html<String> {
    let rows: String = page
        .items
        .iter()
        .map(|b| {
            format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                b.id,
                escape(&b.title),
                escape(&b.authors),
                escape(&b.categories),
                escape(&b.publisher),
                escape(&b.file_name),
                escape(&b.info_link)
            )
        })
        .collect();

    let content = format!(
        r#"<table>
        <thead><tr><th>#</th><th>Title</th><th>Authors</th><th>Genre</th><th>Publisher</th><th>File name</th><th>Info link</th></tr></thead>
        <tbody>{}</tbody>
    </table>
    {}"#,
        if rows.is_empty() {
            r#"<tr><td colspan="7">No book information saved yet.</td></tr>"#.to_string()
        } else {
            rows
        },
        pager("/show_all_book_info", page)
    );
    layout("Book Information", flashes, &content)
}

pub fn error_page(message: &str) -> Html<String> {
    let content = format!(
        r#"<p>{}</p><p><a href="/">Back to the home page</a></p>"#,
        escape(message)
    );
    layout("Something went wrong", &[], &content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::session::FlashKind;

    #[test]
    fn flash_messages_are_escaped() {
        let flashes = vec![Flash {
            kind: FlashKind::Error,
            message: "<script>alert(1)</script>".to_string(),
        }];
        let Html(html) = layout("Upload", &flashes, "");
        assert!(html.contains(r#"<div class="flash error">&lt;script&gt;"#));
        assert!(!html.contains("<script>alert"));
    }

    #[test]
    fn pager_links_neighbours() {
        let page: Page<()> = Page::new(vec![], 2, 10, 35);
        let html = pager("/show_all_book_info", &page);
        assert!(html.contains(r#"href="/show_all_book_info?page=1""#));
        assert!(html.contains(r#"href="/show_all_book_info?page=3""#));
        assert!(html.contains("Page 2 of 4 (35 records)"));
    }

    #[test]
    fn unknown_info_link_is_plain_text() {
        let html = details_list(&BookDetails::from_guess("Dune", "Frank Herbert"));
        assert!(!html.contains("<a href"));
        assert!(html.contains("Frank Herbert"));
    }

    #[test]
    fn cover_urls_are_encoded() {
        assert_eq!(cover_url("my cover.png"), "/static/my%20cover.png");
    }
}
