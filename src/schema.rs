diesel::table! {
    servers (id) {
        id -> Integer,
        cid -> BigInt,              // inventory key, unique and immutable
        cuid -> BigInt,             // customer id grouping servers by tenant
        customer_name -> Text,
        name -> Text,               // server name as per CMDB
        hostname -> Text,
        ip -> Text,
        server_group -> Text,
        os_type -> Text,
        m_dba -> Text,              // Yes | No
        customer_mail_id -> Text,
        created_at -> Timestamp,
        updated_at -> Timestamp,
    }
}

diesel::table! {
    events (id) {
        id -> Text,                 // uuid v4
        customer_name -> Text,
        os_type -> Text,            // Windows | Unix
        server_group -> Text,
        schedule_start_time -> Timestamp,
        schedule_end_time -> Timestamp,
        ticket_number -> Text,
        ticket_creation_status -> Text,   // Pending | Created | Failed
        mail_notification_status -> Text, // Pending | Sent | Failed
        created_at -> Timestamp,
        updated_at -> Timestamp,
    }
}

diesel::allow_tables_to_appear_in_same_query!(servers, events);
