//! Static message copy and prompt builders
//!
//! 文言は運用中のサービスから引き継いだもの。テンプレートエンジンは
//! 使わず、固定文字列と小さな組み立て関数で持ちます。

use super::phase::Topic;
use super::plan::Plan;

/// Main menu shown on first contact
pub const MAIN_MENU: &str = "🌙 運命ナビ占いフォーチュンです。\n\n\
ここでは、恋愛・相性・仕事・人生のテーマを\n\
やさしく、必要なところははっきりとナビゲートします。\n\n\
まずは、気になるメニューの番号を送ってくださいね。\n\n\
1️⃣ 恋愛\n\
2️⃣ 相性\n\
3️⃣ 仕事・生き方\n\
4️⃣ 性格・本質\n\
5️⃣ 手相（画像送信OK）\n\n\
すべての方に【無料で1回、本鑑定】をご利用いただけます✨";

/// Hearing question set for one topic
pub struct QuestionSet {
    pub intro: &'static str,
    pub questions: &'static [&'static str],
}

/// トピックごとの質問セット。質問数が回答の必要数を決める。
pub fn question_set(topic: Topic) -> QuestionSet {
    match topic {
        Topic::Love => QuestionSet {
            intro: "恋愛の鑑定に入る前に、まず3つだけ質問させてくださいね。",
            questions: &[
                "① 今、恋愛で一番気になっていることは何ですか？",
                "② 相手（または状況）との関係性を教えてください。",
                "③ あなたが望んでいる理想の未来はどんな形ですか？",
            ],
        },
        Topic::Relationship => QuestionSet {
            intro: "相性鑑定をより深くするため、2つ教えてください。",
            questions: &[
                "① お相手との現在の関係を教えてください。",
                "② その相手とどうなりたいと感じていますか？",
            ],
        },
        Topic::Job => QuestionSet {
            intro: "仕事・生き方をみる前に、2つ質問させてください。",
            questions: &[
                "① 今、仕事で抱えている悩みや課題は何ですか？",
                "② あなたが本当はどう働きたいかを教えてください。",
            ],
        },
        Topic::Personality => QuestionSet {
            intro: "性格・本質をみる前に、1つだけ教えてください。",
            questions: &["① 今、自分自身について特に気になる部分はどこですか？"],
        },
        Topic::Palm => QuestionSet {
            intro: "手相鑑定ですね✨",
            questions: &["手のひら全体が写るように、明るい場所で撮って送ってください。\n\
利き手・反対の手、どちらでもOKです。\n\
（写真の代わりに、手相の特徴を文章で送っていただいてもかまいません）"],
        },
    }
}

/// Teaser appended to the free reading
pub const FREE_DONE_FOLLOWUP: &str = "ここまでが無料鑑定です✨\n\
続きが気になる場合は、何かメッセージを送ってくださいね。";

/// Short plan guide (also the re-prompt for unmatched plan input)
pub const PLAN_GUIDE_SHORT: &str = "🔮 続けて詳しく知りたい場合は、有料プランをご利用ください。\n\
「1」「2」「3」または「ライト」「シルバー」「ゴールド」で選べます。\n\n\
1️⃣ ライト（2,000円）\n\
2️⃣ シルバー（5,000円 / 3回鑑定）\n\
3️⃣ ゴールド（15,000円 / 相談し放題）\n\n\
迷う場合は「おすすめ教えて」と送ってください😊";

/// Long plan guide sent after the short one
pub const PLAN_GUIDE_LONG: &str = "【プラン詳細】\n\
1️⃣ ライト（2,000円）\n\
・1テーマの鑑定をしっかり丁寧に\n\
・現状整理＋近い未来の流れを知りたい人向け\n\n\
2️⃣ シルバー（5,000円 / 3回鑑定）\n\
・合計3回まで鑑定OK\n\
・日を空けてもOK、状況が動いたときに再鑑定可能\n\
・一度の鑑定では不安が消えない人に最適\n\n\
3️⃣ ゴールド（15,000円 / 相談し放題）\n\
・恋愛も仕事も人生もまとめてOK\n\
・しっかり整えたい、本気で変わりたい人向け\n\n\
選ぶときは「1」「2」「3」またはプラン名でOKです🌙";

/// Static recommendation shown for「おすすめ」
pub const RECOMMEND: &str = "おすすめを整理しますね✨\n\n\
・まず1つのテーマをしっかり見たい → 1️⃣ライト\n\
・3回まで、状況の変化も見ながら整えたい → 2️⃣シルバー\n\
・恋愛も仕事も人生もまとめて深く相談したい → 3️⃣ゴールド\n\n\
番号（1〜3）かプラン名を送ってください🌙";

/// Sent once the payment claim is accepted
pub const PURCHASED_START: &str = "ご購入ありがとうございます✨\n\
確認できました。\n\n\
ここから本鑑定をスタートします🌙\n\
相談したい内容を、そのまま送ってください。\n\n\
状況を把握しやすいよう、以下もあると助かります。\n\
① いまの状況（いつ頃から・何が起きているか）\n\
② 気になっている相手や関係性（いれば）\n\
③ どうなれたら安心できそうか（理想）";

/// Re-prompt while waiting for the payment claim
pub const PAYMENT_REPROMPT: &str = "ご購入の確認がまだできていません🙏\n\
先ほどの商品ページからご購入のうえ、「購入しました」と送ってください。";

/// Sent when a generation call fails; the session is left as it was
pub const RETRY: &str = "申し訳ありません、鑑定の準備に失敗しました🙏\n\
少し時間をおいて、もう一度同じ内容を送ってください。";

/// Reply to the reset keyword
pub const RESET_DONE: &str = "最初からやり直しますね。\n\
メッセージを送るとメニューを表示します🌙";

/// Menu re-prompt for unmatched input
pub fn menu_reprompt() -> String {
    format!("数字で選んでください✨\n\n{}", MAIN_MENU)
}

/// Checkout guidance for a selected plan
pub fn checkout_text(plan: Plan, url: &str) -> String {
    format!(
        "✨{}プラン（{}）をお選びいただきありがとうございます。\n\n\
【お支払い方法】\n\
以下の商品ページからご購入ください👇\n\
{}\n\n\
ご購入が完了しましたら「購入しました」と送ってください✨",
        plan.label(),
        plan.price_label(),
        url
    )
}

/// Sent when the plan's reading quota is used up
pub fn quota_exhausted_text(plan: Plan) -> String {
    format!(
        "{}プランの鑑定回数を使い切りました🙏\n\
続けてご相談いただく場合は、改めてプランをお選びください。",
        plan.label()
    )
}

// ============================================================================
// Prompt builders
// ============================================================================

const FORTUNE_TELLER_PERSONA: &str =
    "あなたは占い師です。やさしく寄り添いながらも、必要なところははっきり伝えてください。";

/// Prompt for the free reading after the hearing completes
pub fn free_reading_prompt(topic: Topic, answers: &[String]) -> String {
    let mut prompt = format!(
        "{}\n以下の情報をもとに、現状→原因→近い未来の流れ→具体的なアドバイスの順で占ってください。\n\n\
テーマ: {}\nユーザー回答:\n",
        FORTUNE_TELLER_PERSONA,
        topic.label()
    );
    for answer in answers {
        prompt.push_str("- ");
        prompt.push_str(answer);
        prompt.push('\n');
    }
    prompt
}

/// Prompt for one paid consultation message
pub fn consultation_prompt(text: &str) -> String {
    format!("{}\nユーザーの相談: {}", FORTUNE_TELLER_PERSONA, text)
}

/// Prompt sent together with a palm photo
pub const PALM_PROMPT: &str = "この手相の写真から、性格・過去・現在・未来の運勢を、\
やさしく寄り添いながらも必要なところははっきり伝える形で説明してください。\
恋愛運・仕事運・金運・総合運も入れてください。";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_question_set_lengths_match_topic_arity() {
        for topic in [
            Topic::Love,
            Topic::Relationship,
            Topic::Job,
            Topic::Personality,
            Topic::Palm,
        ] {
            assert_eq!(question_set(topic).questions.len(), topic.question_count());
        }
    }

    #[test]
    fn test_checkout_text_contains_url() {
        let text = checkout_text(Plan::Light, "https://example.com/light");
        assert!(text.contains("https://example.com/light"));
        assert!(text.contains("ライト"));
    }

    #[test]
    fn test_free_reading_prompt_includes_answers() {
        let answers = vec!["復縁したい".to_string(), "元恋人".to_string()];
        let prompt = free_reading_prompt(Topic::Love, &answers);
        assert!(prompt.contains("恋愛"));
        assert!(prompt.contains("復縁したい"));
        assert!(prompt.contains("元恋人"));
    }
}
