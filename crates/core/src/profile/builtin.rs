use crate::profile::site::{Composition, Matcher, Repair, SiteProfile};

/// The built-in platform profiles, in registration order.
///
/// Order matters: `pubmed` and `ncbi-geo` must come before the generic
/// `ncbi` profile, whose host matcher also covers them.
pub fn builtin_profiles() -> Vec<SiteProfile> {
    vec![wechat(), csdn(), juejin(), nowcoder(), pubmed(), ncbi_geo(), ncbi()]
}

fn wechat() -> SiteProfile {
    SiteProfile::new("wechat", Matcher::host("mp.weixin.qq.com"))
        .title(["#activity-name"])
        .content(["#js_content", "#img-content"])
        .repair(Repair::lazy_images())
}

fn csdn() -> SiteProfile {
    SiteProfile::new("csdn", Matcher::host("blog.csdn.net"))
        .title(["#articleContentId"])
        .content(["#content_views"])
        .remove([
            ".toblog-vip-column-message",
            ".recommend-box",
            "pre .pre-numbering",
            "pre .hljs-button",
            "pre .idx-num",
        ])
}

fn juejin() -> SiteProfile {
    SiteProfile::new("juejin", Matcher::host("juejin.cn"))
        .title([".article-title"])
        .content([".markdown-body", "article"])
        .remove(["style", ".copy-code-btn"])
}

fn nowcoder() -> SiteProfile {
    SiteProfile::new("nowcoder", Matcher::host("nowcoder.com"))
        .title([".post-title"])
        .content([".nc-post-content"])
        .remove([".company-banner", ".post-topic-des"])
}

fn pubmed() -> SiteProfile {
    SiteProfile::new("pubmed", Matcher::host("pubmed.ncbi.nlm.nih.gov"))
        .title(["h1.heading-title"])
        .content(["body"])
        .repair(Repair::Compose(Composition::default()))
}

fn ncbi_geo() -> SiteProfile {
    SiteProfile::new("ncbi-geo", Matcher::host("ncbi.nlm.nih.gov").with_path("/geo/"))
        .title(["h2", "#rptt"])
        .content(["#maincontent", ".rprt", "body"])
        .remove([
            ".breadcrumb",
            "#sidebar",
            ".portlet_content .portlet_actions",
            ".search_results_footer",
            "#nc_breadcrumb",
        ])
}

fn ncbi() -> SiteProfile {
    SiteProfile::new("ncbi", Matcher::host("ncbi.nlm.nih.gov"))
        .title(["h1"])
        .content(["#maincontent", "main"])
        .remove(["nav", ".breadcrumb", "#sidebar", "footer"])
}
