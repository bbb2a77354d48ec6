use hashtags_core::{extract_tags, HashList};

fn tags(text: &str) -> Vec<String> {
    extract_tags(text).into_iter().collect()
}

#[test]
fn umlauts_are_case_folded_and_trailing_period_stripped() {
    let list = HashList::in_memory();
    list.id_update("id_c", "blabla #HÄSCH1 blabla #hash3. Blabla");

    assert_eq!(list.hash_list("#häsch1"), vec!["id_c"]);
    assert_eq!(list.hash_list("#hash3"), vec!["id_c"]);
    assert_eq!(list.len(), 2);
}

#[test]
fn update_adds_source_to_existing_tags() {
    let list = HashList::in_memory();
    for tag in ["#häsch1", "#hash2", "#hash3"] {
        list.hash_add(tag, "id_b");
    }

    list.id_update("id_a", "blabla #hash2. Blabla #hash3 blabla");
    assert_eq!(list.hash_list("#häsch1"), vec!["id_b"]);
    assert_eq!(list.hash_list("#hash2"), vec!["id_a", "id_b"]);
    assert_eq!(list.hash_list("#hash3"), vec!["id_a", "id_b"]);
}

#[test]
fn quoted_markdown_with_links_yields_only_hashtags() {
    let text = "\n> #KurzErklärt #Zensurheberrecht verhindern – \n> [Glyphosat-Gutachten selbst anfragen!](https://fragdenstaat.de/aktionen/zensurheberrecht-2019/)\n";
    assert_eq!(tags(text), vec!["#kurzerklärt", "#zensurheberrecht"]);
}

#[test]
fn emphasis_markup_is_not_part_of_the_token() {
    let text = "blabla **#HÄSCH1** blabla\n\n_#hash3_";
    assert_eq!(tags(text), vec!["#hash3", "#häsch1"]);
}

#[test]
fn html_entities_and_url_fragments_are_skipped() {
    let text = r#"blabla&#39; **#hash2** blabla\n\<a href="page##hash3">txt</a> #hash4"#;
    assert_eq!(tags(text), vec!["#hash2", "#hash4"]);
}

#[test]
fn embedded_sigils_do_not_start_tokens() {
    assert!(tags("page#hash3").is_empty());
    assert!(tags("mail me at someone@example.com").is_empty());
    assert!(tags("rock&#39;n roll").is_empty());
    assert!(tags("x@#tag y#@who").is_empty());
    assert_eq!(tags("...</a> #hash4"), vec!["#hash4"]);
}

#[test]
fn punctuation_right_before_a_sigil_is_a_separator() {
    for text in [
        "end.#rust",
        "a;#rust",
        "x/#rust",
        "1)#rust",
        "hi!#rust",
        "a-#rust",
        "Tags:#rust",
    ] {
        assert_eq!(tags(text), vec!["#rust"], "{text}");
    }
    assert_eq!(tags("cc:@Ferris"), vec!["@Ferris"]);
}

#[test]
fn tokens_stop_at_sentence_punctuation_and_brackets() {
    let text = "(#one) [#two], \"#three\"; #four: #five! #six? “#seven” *#eight*";
    assert_eq!(
        tags(text),
        vec!["#eight", "#five", "#four", "#one", "#seven", "#six", "#three", "#two"]
    );
}

#[test]
fn mentions_keep_case_and_dedupe_by_exact_text() {
    assert_eq!(
        tags("@Alice met @alice and @Alice again"),
        vec!["@Alice", "@alice"]
    );
}

#[test]
fn digits_are_valid_token_characters() {
    assert_eq!(tags("#2024 recap #Q4"), vec!["#2024", "#q4"]);
}
