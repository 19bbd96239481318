use cdnflow_cloud::rewrite_uri;
use colored::Colorize;

pub fn handle(uris: &[String]) {
    for uri in uris {
        let rewritten = rewrite_uri(uri);
        if rewritten == *uri {
            println!("{} {}", uri, "(変更なし)".dimmed());
        } else {
            println!("{} → {}", uri, rewritten.green());
        }
    }
}
